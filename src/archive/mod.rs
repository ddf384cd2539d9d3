//! Archive parsing and the entry collection.
//!
//! `Archive::open` walks the directory once, grouping consecutive merged
//! entries into shared blocks, and exposes the result as an ordered,
//! name-indexed collection. Decompression happens later, per block, on the
//! first request for bytes.

pub mod block;
pub mod entry;
pub mod header;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

pub use block::Block;
pub use entry::{latin1_to_string, Entry, Segment};
pub use header::EntryHeader;
pub use types::{
    ArchiveFlags, CompressionMode, DateStamp, HeaderFlags, MachineType, ProtectionBits,
};

use crate::bitstream::BitReader;
use crate::error::{LzxError, Result};

use entry::EntryBuilder;

/// A parsed archive borrowing the underlying bytes.
#[derive(Debug)]
pub struct Archive<'a> {
    flags: ArchiveFlags,
    entries: Vec<Entry<'a>>,
    index: HashMap<Vec<u8>, usize>,
}

/// A merged entry waiting for its run's block leader.
struct PendingMerge {
    builder: usize,
    offset: usize,
    length: usize,
}

impl<'a> Archive<'a> {
    /// Parse the full directory. Fails fast: any malformed header aborts the
    /// open, leaving no partially usable archive behind.
    pub fn open(data: &'a [u8]) -> Result<Archive<'a>> {
        let mut src = BitReader::new(data);
        let flags = header::parse_info_header(&mut src)?;

        let mut builders: Vec<EntryBuilder<'a>> = Vec::new();
        let mut index: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut pending: Vec<PendingMerge> = Vec::new();
        let mut run_offset = 0usize;

        while !src.is_eof() {
            let entry_header = EntryHeader::parse(&mut src)?;
            let pack_size = entry_header.pack_size as usize;
            let unpack_size = entry_header.unpack_size as usize;
            let merged = entry_header.flags.is_merged();
            let mode = entry_header.compression_mode;
            let name = entry_header.filename.clone();

            // First occurrence of a name wins; later occurrences only add
            // segments to it.
            let builder_index = match index.get(&name) {
                Some(&existing) => existing,
                None => {
                    builders.push(EntryBuilder::new(name.clone(), entry_header));
                    index.insert(name, builders.len() - 1);
                    builders.len() - 1
                }
            };

            if merged {
                pending.push(PendingMerge {
                    builder: builder_index,
                    offset: run_offset,
                    length: unpack_size,
                });
                run_offset += unpack_size;

                if pack_size > 0 {
                    // Block leader: its payload covers the whole run.
                    let payload = src.read_slice(pack_size)?;
                    let block = Arc::new(Block::new(payload, mode, run_offset));
                    for merge in pending.drain(..) {
                        builders[merge.builder].add_segment(
                            Arc::clone(&block),
                            merge.offset,
                            merge.length,
                        );
                    }
                    run_offset = 0;
                }
            } else {
                let payload = src.read_slice(pack_size)?;
                let block = Arc::new(Block::new(payload, mode, unpack_size));
                builders[builder_index].add_segment(block, 0, unpack_size);
            }
        }

        if !pending.is_empty() {
            // A merge run must be closed by an entry carrying the payload.
            return Err(LzxError::UnexpectedEof);
        }

        Ok(Archive {
            flags,
            entries: builders.into_iter().map(EntryBuilder::build).collect(),
            index,
        })
    }

    /// The info-header flag octet (damage-protected / locked bits).
    pub fn flags(&self) -> ArchiveFlags {
        self.flags
    }

    /// All entries, in archive byte order.
    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its raw Latin-1 name.
    pub fn entry_by_bytes(&self, name: &[u8]) -> Option<&Entry<'a>> {
        self.index.get(name).map(|&at| &self.entries[at])
    }

    /// Look up an entry by name, accepting the `String` form produced by
    /// [`Entry::name`]. Characters outside Latin-1 cannot match anything.
    pub fn entry(&self, name: &str) -> Option<&Entry<'a>> {
        let mut raw = Vec::with_capacity(name.len());
        for ch in name.chars() {
            let code = ch as u32;
            if code > 0xFF {
                return None;
            }
            raw.push(code as u8);
        }
        self.entry_by_bytes(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::Crc32;

    const INFO_HEADER: [u8; 10] = [0x4C, 0x5A, 0x58, 0, 0, 0, 0, 0, 0, 0];

    /// Raw entry header with a valid checksum, store payload appended by the
    /// caller.
    fn raw_entry(
        unpack_size: u32,
        pack_size: u32,
        mode: u8,
        flags: u8,
        data_crc: u32,
        filename: &[u8],
    ) -> Vec<u8> {
        let mut fixed = [0u8; header::ENTRY_HEADER_SIZE];
        fixed[2..6].copy_from_slice(&unpack_size.to_le_bytes());
        fixed[6..10].copy_from_slice(&pack_size.to_le_bytes());
        fixed[10] = 10;
        fixed[11] = mode;
        fixed[12] = flags;
        fixed[15] = 10;
        fixed[22..26].copy_from_slice(&data_crc.to_le_bytes());
        fixed[30] = filename.len() as u8;

        let mut crc = Crc32::new();
        crc.update(&fixed);
        crc.update(filename);
        fixed[26..30].copy_from_slice(&crc.sum().to_le_bytes());

        let mut bytes = fixed.to_vec();
        bytes.extend_from_slice(filename);
        bytes
    }

    #[test]
    fn empty_archive_has_no_entries() {
        let archive = Archive::open(&INFO_HEADER).unwrap();
        assert!(archive.is_empty());
        assert_eq!(archive.entries().len(), 0);
    }

    #[test]
    fn bad_magic_is_not_lzx() {
        let mut bytes = INFO_HEADER;
        bytes[2] = b'Y';
        assert_eq!(Archive::open(&bytes).unwrap_err(), LzxError::NotLzxFile);
    }

    #[test]
    fn store_entry_roundtrip() {
        let payload = [0x01u8, 0x02, 0x03];
        let mut bytes = INFO_HEADER.to_vec();
        bytes.extend(raw_entry(3, 3, 0, 0, crate::crc::crc32(&payload), b"a.bin"));
        bytes.extend_from_slice(&payload);

        let archive = Archive::open(&bytes).unwrap();
        assert_eq!(archive.len(), 1);
        let entry = archive.entry("a.bin").unwrap();
        assert_eq!(entry.name(), "a.bin");
        assert_eq!(entry.unpack_size(), 3);
        assert_eq!(entry.pack_size(), Some(3));
        assert_eq!(entry.bytes().unwrap(), payload);
    }

    #[test]
    fn merged_run_without_leader_is_eof() {
        let mut bytes = INFO_HEADER.to_vec();
        bytes.extend(raw_entry(4, 0, 2, 1, 0, b"one"));
        bytes.extend(raw_entry(4, 0, 2, 1, 0, b"two"));
        assert_eq!(Archive::open(&bytes).unwrap_err(), LzxError::UnexpectedEof);
    }

    #[test]
    fn merged_run_groups_one_block() {
        // Two merged entries; the second carries the (store-mode) payload.
        let payload = b"firstsecond!";
        let mut bytes = INFO_HEADER.to_vec();
        bytes.extend(raw_entry(5, 0, 0, 1, crate::crc::crc32(b"first"), b"one"));
        bytes.extend(raw_entry(
            7,
            payload.len() as u32,
            0,
            1,
            crate::crc::crc32(b"second!"),
            b"two",
        ));
        bytes.extend_from_slice(payload);

        let archive = Archive::open(&bytes).unwrap();
        assert_eq!(archive.len(), 2);
        let one = archive.entry("one").unwrap();
        let two = archive.entry("two").unwrap();
        assert!(one.is_merged() && two.is_merged());
        assert_eq!(one.bytes().unwrap(), b"first");
        assert_eq!(two.bytes().unwrap(), b"second!");
        // Both entries resolve against the same cached buffer.
        assert!(Arc::ptr_eq(
            one.segments()[0].block(),
            two.segments()[0].block()
        ));
    }

    #[test]
    fn duplicate_names_accumulate_segments() {
        let payload = b"abcdef";
        let mut bytes = INFO_HEADER.to_vec();
        bytes.extend(raw_entry(2, 0, 0, 1, 0, b"same"));
        bytes.extend(raw_entry(4, payload.len() as u32, 0, 1, 0, b"same"));
        bytes.extend_from_slice(payload);

        let archive = Archive::open(&bytes).unwrap();
        assert_eq!(archive.len(), 1);
        let entry = archive.entry("same").unwrap();
        assert_eq!(entry.segments().len(), 2);
        assert_eq!(entry.unpack_size(), 6);
        assert_eq!(entry.bytes().unwrap(), b"abcdef");
    }

    #[test]
    fn truncated_directory_fails_fast() {
        let payload = [0u8; 3];
        let mut bytes = INFO_HEADER.to_vec();
        bytes.extend(raw_entry(3, 3, 0, 0, 0, b"a"));
        bytes.extend_from_slice(&payload);
        // Chop into the payload: the header parses but the slice read fails.
        bytes.truncate(bytes.len() - 2);
        assert_eq!(Archive::open(&bytes).unwrap_err(), LzxError::UnexpectedEof);
    }

    #[test]
    fn zero_byte_entry_has_empty_bytes() {
        let mut bytes = INFO_HEADER.to_vec();
        bytes.extend(raw_entry(0, 0, 0, 0, 0, b"empty"));
        let archive = Archive::open(&bytes).unwrap();
        let entry = archive.entry("empty").unwrap();
        assert_eq!(entry.unpack_size(), 0);
        assert_eq!(entry.bytes().unwrap(), Vec::<u8>::new());
        assert_eq!(entry.data_crc(), 0);
    }
}
