//! Archive info header and per-entry header parsing.
//!
//! The info header is ten bytes: the `LZX` identifier, one flag octet, and
//! six reserved bytes. Each entry header is a packed 31-byte structure
//! followed by the filename and comment octets; its own CRC-32 covers all
//! three parts with the stored checksum field zeroed.

use crate::archive::types::{
    ArchiveFlags, CompressionMode, DateStamp, HeaderFlags, MachineType, ProtectionBits,
};
use crate::bitstream::BitReader;
use crate::crc::Crc32;
use crate::error::{LzxError, Result};

/// Size of the archive info header.
pub const INFO_HEADER_SIZE: usize = 10;

/// Size of the fixed part of an entry header.
pub const ENTRY_HEADER_SIZE: usize = 31;

/// The three identifier bytes every archive starts with.
pub const MAGIC: &[u8; 3] = b"LZX";

fn read_le32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn read_be32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Validate the ten-byte info header and return its flag octet.
pub fn parse_info_header(src: &mut BitReader<'_>) -> Result<ArchiveFlags> {
    let mut header = [0u8; INFO_HEADER_SIZE];
    src.read_into(&mut header)?;
    if &header[..3] != MAGIC {
        return Err(LzxError::NotLzxFile);
    }
    Ok(ArchiveFlags::from_raw(header[3]))
}

/// One parsed entry header, filename and comment included.
#[derive(Debug, Clone)]
pub struct EntryHeader {
    pub attributes: ProtectionBits,
    pub unpack_size: u32,
    pub pack_size: u32,
    pub machine_type: MachineType,
    pub compression_mode: CompressionMode,
    pub flags: HeaderFlags,
    pub extract_version: u8,
    pub date: DateStamp,
    pub data_crc: u32,
    pub header_crc: u32,
    /// Latin-1 octets, preserved verbatim.
    pub filename: Vec<u8>,
    /// Latin-1 octets, possibly empty.
    pub comment: Vec<u8>,
}

impl EntryHeader {
    /// Parse the fixed part and both variable tails, then verify the header
    /// CRC-32 (computed with the stored checksum field zeroed).
    pub fn parse(src: &mut BitReader<'_>) -> Result<EntryHeader> {
        let mut fixed = [0u8; ENTRY_HEADER_SIZE];
        src.read_into(&mut fixed)?;

        let comment_length = usize::from(fixed[14]);
        let filename_length = usize::from(fixed[30]);
        let filename = src.read_slice(filename_length)?.to_vec();
        let comment = src.read_slice(comment_length)?.to_vec();

        let header_crc = read_le32(&fixed, 26);
        let mut scratch = fixed;
        scratch[26..30].fill(0);
        let mut crc = Crc32::new();
        crc.update(&scratch);
        crc.update(&filename);
        crc.update(&comment);
        if crc.sum() != header_crc {
            return Err(LzxError::ChecksumInvalid);
        }

        Ok(EntryHeader {
            attributes: ProtectionBits::from_raw(fixed[0]),
            unpack_size: read_le32(&fixed, 2),
            pack_size: read_le32(&fixed, 6),
            machine_type: MachineType::from_raw(fixed[10]),
            compression_mode: CompressionMode::from_info_byte(fixed[11]),
            flags: HeaderFlags::from_raw(fixed[12]),
            extract_version: fixed[15],
            date: DateStamp::from_raw(read_be32(&fixed, 18)),
            data_crc: read_le32(&fixed, 22),
            header_crc,
            filename,
            comment,
        })
    }
}
