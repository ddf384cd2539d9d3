//! One independently decompressible region of the archive.
//!
//! A block is created during the directory walk and decompressed the first
//! time any consumer asks for bytes. The result — or the failure — is cached
//! in a once-initialised slot, so every segment of every entry drawing from
//! the block sees the same outcome and the payload is decoded at most once,
//! even if consumers race from multiple threads.

use std::sync::OnceLock;

use crate::archive::types::CompressionMode;
use crate::bitstream::BitReader;
use crate::error::{LzxError, Result};
use crate::huffman::decoder::{LzxDecoder, MAX_MATCH_LENGTH};

/// A compressed payload plus everything needed to decode it on demand.
#[derive(Debug)]
pub struct Block<'a> {
    payload: &'a [u8],
    mode: CompressionMode,
    total_unpacked: usize,
    data: OnceLock<Result<Vec<u8>>>,
}

impl<'a> Block<'a> {
    pub(crate) fn new(payload: &'a [u8], mode: CompressionMode, total_unpacked: usize) -> Self {
        Self {
            payload,
            mode,
            total_unpacked,
            data: OnceLock::new(),
        }
    }

    /// Length of the compressed payload (the leader's declared pack size).
    pub fn pack_size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Sum of the unpack sizes of every entry drawing from this block.
    pub fn total_unpacked_size(&self) -> usize {
        self.total_unpacked
    }

    pub fn compression_mode(&self) -> CompressionMode {
        self.mode
    }

    /// The decompressed bytes, produced on first demand and cached — errors
    /// included, so a damaged block fails identically every time.
    pub fn data(&self) -> Result<&[u8]> {
        match self.data.get_or_init(|| self.decompress()) {
            Ok(bytes) => Ok(bytes),
            Err(err) => Err(*err),
        }
    }

    fn decompress(&self) -> Result<Vec<u8>> {
        match self.mode {
            CompressionMode::Store => {
                let take = self.payload.len().min(self.total_unpacked);
                Ok(self.payload[..take].to_vec())
            }
            CompressionMode::Normal => self.decompress_normal(),
            CompressionMode::Unknown(_) => Err(LzxError::UnknownCompression),
        }
    }

    fn decompress_normal(&self) -> Result<Vec<u8>> {
        let total = self.total_unpacked;
        // Slack absorbs a match finishing past the final section threshold;
        // everything beyond the declared size is discarded.
        let mut dest = vec![0u8; total + MAX_MATCH_LENGTH];
        let mut src = BitReader::new(self.payload);
        let mut decoder = LzxDecoder::new();
        let mut section_remaining = 0usize;
        let mut pos = 0usize;

        while pos < total {
            if section_remaining == 0 {
                decoder.read_literal_table(&mut src)?;
                section_remaining = decoder.section_length();
            }

            let target = total.min(pos + section_remaining);
            let before = pos;
            decoder.decrunch(&mut src, &mut dest, &mut pos, target)?;
            let decoded = pos - before;

            if decoded == 0 && src.is_eof() {
                return Err(LzxError::UnexpectedEof);
            }
            section_remaining = section_remaining.saturating_sub(decoded);
        }

        dest.truncate(total);
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_mode_is_verbatim() {
        let payload = [0x01u8, 0x02, 0x03];
        let block = Block::new(&payload, CompressionMode::Store, 3);
        assert_eq!(block.data().unwrap(), &payload);
    }

    #[test]
    fn store_mode_clamps_to_total() {
        let payload = [0x10u8, 0x20, 0x30, 0x40];
        let block = Block::new(&payload, CompressionMode::Store, 2);
        assert_eq!(block.data().unwrap(), &[0x10, 0x20]);
    }

    #[test]
    fn store_mode_short_payload_takes_what_exists() {
        let payload = [0xAAu8];
        let block = Block::new(&payload, CompressionMode::Store, 4);
        assert_eq!(block.data().unwrap(), &[0xAA]);
    }

    #[test]
    fn data_is_cached_across_calls() {
        let payload = [0x01u8, 0x02];
        let block = Block::new(&payload, CompressionMode::Store, 2);
        let first = block.data().unwrap().as_ptr();
        let second = block.data().unwrap().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_mode_fails_identically_every_time() {
        let payload = [0u8; 4];
        let block = Block::new(&payload, CompressionMode::Unknown(5), 4);
        assert_eq!(block.data().unwrap_err(), LzxError::UnknownCompression);
        assert_eq!(block.data().unwrap_err(), LzxError::UnknownCompression);
    }

    #[test]
    fn empty_normal_payload_is_eof() {
        let block = Block::new(&[], CompressionMode::Normal, 4);
        assert_eq!(block.data().unwrap_err(), LzxError::UnexpectedEof);
    }

    #[test]
    fn zero_length_block_decodes_to_nothing() {
        let block = Block::new(&[], CompressionMode::Normal, 0);
        assert_eq!(block.data().unwrap(), &[] as &[u8]);
        let stored = Block::new(&[], CompressionMode::Store, 0);
        assert_eq!(stored.data().unwrap(), &[] as &[u8]);
    }
}
