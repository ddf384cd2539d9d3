//! Entries and the segments that map them onto blocks.

use std::sync::Arc;

use crate::archive::block::Block;
use crate::archive::header::EntryHeader;
use crate::archive::types::{CompressionMode, DateStamp, HeaderFlags, MachineType, ProtectionBits};
use crate::error::{LzxError, Result};

/// Lossless Latin-1 view of a byte string: every octet maps to the Unicode
/// code point of the same value.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// One contiguous run of an entry's bytes inside a block's decompressed
/// buffer.
#[derive(Debug)]
pub struct Segment<'a> {
    block: Arc<Block<'a>>,
    offset: usize,
    length: usize,
}

impl<'a> Segment<'a> {
    pub(crate) fn new(block: Arc<Block<'a>>, offset: usize, length: usize) -> Self {
        Self { block, offset, length }
    }

    pub fn block(&self) -> &Arc<Block<'a>> {
        &self.block
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The segment's bytes, decompressing the block on first demand.
    pub fn data(&self) -> Result<&[u8]> {
        let data = self.block.data()?;
        data.get(self.offset..self.offset + self.length)
            .ok_or(LzxError::OutOfRange)
    }
}

/// One named file in the archive.
#[derive(Debug)]
pub struct Entry<'a> {
    name: Vec<u8>,
    metadata: EntryHeader,
    segments: Vec<Segment<'a>>,
}

impl<'a> Entry<'a> {
    pub(crate) fn new(name: Vec<u8>, metadata: EntryHeader, segments: Vec<Segment<'a>>) -> Self {
        Self { name, metadata, segments }
    }

    /// The filename exactly as stored: Latin-1 octets.
    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }

    /// The filename as a `String` (lossless Latin-1 mapping).
    pub fn name(&self) -> String {
        latin1_to_string(&self.name)
    }

    /// The parsed header of the entry's first occurrence.
    pub fn metadata(&self) -> &EntryHeader {
        &self.metadata
    }

    pub fn attributes(&self) -> ProtectionBits {
        self.metadata.attributes
    }

    pub fn datestamp(&self) -> DateStamp {
        self.metadata.date
    }

    pub fn machine_type(&self) -> MachineType {
        self.metadata.machine_type
    }

    pub fn compression_mode(&self) -> CompressionMode {
        self.metadata.compression_mode
    }

    pub fn flags(&self) -> HeaderFlags {
        self.metadata.flags
    }

    /// CRC-32 the archive declares for the entry's decompressed bytes.
    pub fn data_crc(&self) -> u32 {
        self.metadata.data_crc
    }

    /// The comment octets (empty when the entry has none).
    pub fn comment_bytes(&self) -> &[u8] {
        &self.metadata.comment
    }

    pub fn comment(&self) -> String {
        latin1_to_string(&self.metadata.comment)
    }

    pub fn is_merged(&self) -> bool {
        self.metadata.flags.is_merged()
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Total decompressed size: the sum of the segment lengths.
    pub fn unpack_size(&self) -> u64 {
        self.segments.iter().map(|s| s.length() as u64).sum()
    }

    /// Compressed size. Exact for an entry that owns its block; for merged
    /// entries the block's packed size is apportioned by the entry's share
    /// of the decompressed total, which is only an estimate.
    pub fn pack_size(&self) -> Option<u64> {
        if !self.is_merged() {
            return Some(u64::from(self.metadata.pack_size));
        }
        let mut guessed = 0.0f64;
        for segment in &self.segments {
            let block_total = segment.block().total_unpacked_size();
            if block_total > 0 {
                let ratio = segment.length() as f64 / block_total as f64;
                guessed += ratio * segment.block().pack_size() as f64;
            }
        }
        Some(guessed as u64)
    }

    /// The entry's decompressed bytes: its segments' slices, concatenated in
    /// declaration order. Triggers block decompression as needed; a block
    /// failure is returned as the block's cached error.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        let total: usize = self.segments.iter().map(Segment::length).sum();
        let mut bytes = Vec::with_capacity(total);
        for segment in &self.segments {
            bytes.extend_from_slice(segment.data()?);
        }
        Ok(bytes)
    }
}

/// Accumulates the segments of one name while the directory walk runs.
pub(crate) struct EntryBuilder<'a> {
    name: Vec<u8>,
    metadata: EntryHeader,
    segments: Vec<Segment<'a>>,
}

impl<'a> EntryBuilder<'a> {
    pub(crate) fn new(name: Vec<u8>, metadata: EntryHeader) -> Self {
        Self { name, metadata, segments: Vec::new() }
    }

    pub(crate) fn add_segment(&mut self, block: Arc<Block<'a>>, offset: usize, length: usize) {
        self.segments.push(Segment::new(block, offset, length));
    }

    pub(crate) fn build(self) -> Entry<'a> {
        Entry::new(self.name, self.metadata, self.segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::types::CompressionMode;

    fn store_block(payload: &[u8], total: usize) -> Arc<Block<'_>> {
        Arc::new(Block::new(payload, CompressionMode::Store, total))
    }

    #[test]
    fn latin1_is_lossless() {
        let raw: Vec<u8> = (0u8..=255).collect();
        let text = latin1_to_string(&raw);
        let back: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
        assert_eq!(back, raw);
        assert_eq!(latin1_to_string(b"caf\xE9"), "café");
    }

    #[test]
    fn segments_slice_the_block() {
        let payload = b"hello world";
        let block = store_block(payload, payload.len());
        let head = Segment::new(Arc::clone(&block), 0, 5);
        let tail = Segment::new(Arc::clone(&block), 6, 5);
        assert_eq!(head.data().unwrap(), b"hello");
        assert_eq!(tail.data().unwrap(), b"world");
    }

    #[test]
    fn segment_past_buffer_is_out_of_range() {
        let payload = b"abc";
        let block = store_block(payload, 3);
        let segment = Segment::new(block, 2, 5);
        assert_eq!(segment.data().unwrap_err(), LzxError::OutOfRange);
    }

    #[test]
    fn bytes_concatenates_segments_in_order() {
        let payload = b"0123456789";
        let block = store_block(payload, 10);
        let mut builder = EntryBuilder::new(
            b"x".to_vec(),
            crate::archive::header::EntryHeader {
                attributes: ProtectionBits::from_raw(0),
                unpack_size: 10,
                pack_size: 10,
                machine_type: MachineType::Amiga,
                compression_mode: CompressionMode::Store,
                flags: HeaderFlags::from_raw(0),
                extract_version: 10,
                date: DateStamp::from_raw(0),
                data_crc: 0,
                header_crc: 0,
                filename: b"x".to_vec(),
                comment: Vec::new(),
            },
        );
        builder.add_segment(Arc::clone(&block), 0, 4);
        builder.add_segment(Arc::clone(&block), 4, 6);
        let entry = builder.build();
        assert_eq!(entry.unpack_size(), 10);
        assert_eq!(entry.bytes().unwrap(), payload);
    }
}
