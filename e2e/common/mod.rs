//! Shared fixture builders for the end-to-end suites.
//!
//! Real archives are fabricated from scratch: a bit writer that is the exact
//! inverse of the decoder's word-based reader, a minimal literal-only LZX
//! packer built on it, and raw entry-header assembly with valid checksums.

#![allow(dead_code)]

use lzx::crc::{crc32, Crc32};

/// Size of the fixed part of an entry header.
pub const ENTRY_HEADER_SIZE: usize = 31;

/// A minimal valid archive: the info header alone.
pub const INFO_HEADER: [u8; 10] = [0x4C, 0x5A, 0x58, 0x00, 0, 0, 0, 0, 0, 0];

// ─────────────────────────────────────────────────────────────────────────────
// Bit writer
// ─────────────────────────────────────────────────────────────────────────────

/// Inverse of the archive's bit reader: bits queue low-first and flush as
/// big-endian 16-bit words, with one trailing padding word the way real
/// packers pad their streams.
pub struct BitWriter {
    bits: Vec<bool>,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Queue the low `count` bits of `value`, least significant first.
    pub fn write_bits(&mut self, value: u16, count: u32) {
        for bit in 0..count {
            self.bits.push(value & (1 << bit) != 0);
        }
    }

    /// Queue a canonical Huffman code, most significant bit first.
    pub fn write_code(&mut self, code: u16, length: u32) {
        for bit in (0..length).rev() {
            self.bits.push(code & (1 << bit) != 0);
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        while self.bits.len() % 16 != 0 {
            self.bits.push(false);
        }
        let mut bytes = Vec::with_capacity(self.bits.len() / 8 + 2);
        for chunk in self.bits.chunks(16) {
            let mut word = 0u16;
            for (index, &bit) in chunk.iter().enumerate() {
                if bit {
                    word |= 1 << index;
                }
            }
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// A literal-only LZX packer
// ─────────────────────────────────────────────────────────────────────────────

/// Write one section header declaring `section_length` output bytes, with a
/// literal tree giving the 256 byte symbols 9-bit codes and the 512 match
/// symbols 10-bit codes (256/2⁹ + 512/2¹⁰ = 1, a complete code).
///
/// The pretree used for both passes has exactly two one-bit codes: symbol 7
/// (code 0, yielding length 10) and symbol 8 (code 1, yielding length 9).
pub fn write_uniform_section_header(writer: &mut BitWriter, section_length: usize, method: u16) {
    writer.write_bits(method, 3);
    if method == 3 {
        for _ in 0..8 {
            writer.write_bits(3, 3);
        }
    }
    writer.write_bits((section_length >> 16) as u16, 8);
    writer.write_bits((section_length >> 8) as u16, 8);
    writer.write_bits(section_length as u16, 8);

    write_uniform_pretree_pass(writer, 256, 1);
    write_uniform_pretree_pass(writer, 512, 0);
}

fn write_uniform_pretree_pass(writer: &mut BitWriter, symbols: usize, pretree_code: u16) {
    for symbol in 0..20u16 {
        writer.write_bits(u16::from(symbol == 7 || symbol == 8), 4);
    }
    for _ in 0..symbols {
        writer.write_code(pretree_code, 1);
    }
}

/// The canonical code of a literal-table symbol under the uniform tree.
pub fn write_literal_symbol(writer: &mut BitWriter, symbol: u16) {
    if symbol < 256 {
        writer.write_code(symbol, 9);
    } else {
        writer.write_code(512 + (symbol - 256), 10);
    }
}

/// Compress `data` as one literal-only section (no matches). The output is a
/// complete normal-mode block payload.
pub fn compress_literals(data: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, data.len(), 3);
    for &byte in data {
        write_literal_symbol(&mut writer, u16::from(byte));
    }
    writer.finish()
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry headers and whole archives
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a fabricated entry header can vary.
pub struct EntrySpec<'a> {
    pub name: &'a [u8],
    pub unpack_size: u32,
    pub pack_size: u32,
    pub mode: u8,
    pub flags: u8,
    pub data_crc: u32,
    pub attributes: u8,
    pub comment: &'a [u8],
    pub date_raw: u32,
}

impl<'a> EntrySpec<'a> {
    pub fn store(name: &'a [u8], payload: &[u8]) -> Self {
        Self {
            name,
            unpack_size: payload.len() as u32,
            pack_size: payload.len() as u32,
            mode: 0,
            flags: 0,
            data_crc: crc32(payload),
            attributes: 0x0F,
            comment: b"",
            date_raw: 0,
        }
    }
}

/// Assemble a raw entry header (fixed part + name + comment) with a valid
/// header CRC.
pub fn entry_header(spec: &EntrySpec<'_>) -> Vec<u8> {
    let mut fixed = [0u8; ENTRY_HEADER_SIZE];
    fixed[0] = spec.attributes;
    fixed[2..6].copy_from_slice(&spec.unpack_size.to_le_bytes());
    fixed[6..10].copy_from_slice(&spec.pack_size.to_le_bytes());
    fixed[10] = 10; // Amiga
    fixed[11] = spec.mode;
    fixed[12] = spec.flags;
    fixed[14] = spec.comment.len() as u8;
    fixed[15] = 10; // extract version
    fixed[18..22].copy_from_slice(&spec.date_raw.to_be_bytes());
    fixed[22..26].copy_from_slice(&spec.data_crc.to_le_bytes());
    fixed[30] = spec.name.len() as u8;

    let mut crc = Crc32::new();
    crc.update(&fixed);
    crc.update(spec.name);
    crc.update(spec.comment);
    fixed[26..30].copy_from_slice(&crc.sum().to_le_bytes());

    let mut bytes = fixed.to_vec();
    bytes.extend_from_slice(spec.name);
    bytes.extend_from_slice(spec.comment);
    bytes
}

/// An archive of store-mode entries.
pub fn store_archive(entries: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut bytes = INFO_HEADER.to_vec();
    for (name, payload) in entries {
        bytes.extend(entry_header(&EntrySpec::store(name, payload)));
        bytes.extend_from_slice(payload);
    }
    bytes
}

/// An archive with one normal-mode (compressed) entry.
pub fn compressed_archive(name: &[u8], data: &[u8]) -> Vec<u8> {
    let payload = compress_literals(data);
    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        name,
        unpack_size: data.len() as u32,
        pack_size: payload.len() as u32,
        mode: 2,
        flags: 0,
        data_crc: crc32(data),
        attributes: 0x0F,
        comment: b"",
        date_raw: 0,
    }));
    bytes.extend_from_slice(&payload);
    bytes
}

/// A merge group: every listed entry shares one compressed block, the last
/// one carrying the payload. Returns the whole archive.
pub fn merged_archive(members: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut combined = Vec::new();
    for (_, data) in members {
        combined.extend_from_slice(data);
    }
    let payload = compress_literals(&combined);

    let mut bytes = INFO_HEADER.to_vec();
    for (index, (name, data)) in members.iter().enumerate() {
        let leader = index == members.len() - 1;
        bytes.extend(entry_header(&EntrySpec {
            name,
            unpack_size: data.len() as u32,
            pack_size: if leader { payload.len() as u32 } else { 0 },
            mode: 2,
            flags: 1,
            data_crc: crc32(data),
            attributes: 0x0F,
            comment: b"",
            date_raw: 0,
        }));
    }
    bytes.extend_from_slice(&payload);
    bytes
}
