//! The LZX literal/match decoder.
//!
//! A compressed payload is a sequence of *literal sections*. Each section
//! opens with a small header: a 3-bit method, an optional refresh of the
//! aligned-offset tree, a 24-bit section byte count, and (for methods 2
//! and 3) a refresh of the 768-symbol literal tree, itself encoded through a
//! 20-symbol pretree of length deltas and zero runs. After the header,
//! symbols decode into literals and LZ77 matches until the section's byte
//! count is exhausted.
//!
//! The decoder owns per-block state only. In particular `last_offset`, the
//! sticky match offset, starts at 1 for every block and must never leak
//! across blocks.

use crate::bitstream::BitReader;
use crate::error::{LzxError, Result};
use crate::huffman::table::HuffmanTable;

/// Extra-bit counts, indexed by offset slot (and, through the low half, by
/// length slot).
const EXTRA_BITS: [u32; 32] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, //
    7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13, 13, 14, 14,
];

/// Base match offsets, indexed by offset slot.
const OFFSET_BASE: [u32; 32] = [
    0, 1, 2, 3, 4, 6, 8, 12, 16, 24, 32, 48, 64, 96, 128, 192, //
    256, 384, 512, 768, 1024, 1536, 2048, 3072, //
    4096, 6144, 8192, 12288, 16384, 24576, 32768, 49152,
];

/// Base match lengths, indexed by length slot (the low 16 offset bases).
const LENGTH_BASE: [u32; 16] = [0, 1, 2, 3, 4, 6, 8, 12, 16, 24, 32, 48, 64, 96, 128, 192];

/// Reduction table realising the code-length delta rule: the new length for
/// a tree element is `MOD17[old_length + 17 − delta_symbol]`, i.e. the delta
/// applied modulo 17.
const MOD17: [u8; 34] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, //
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
];

/// Pretree symbol: run of zero lengths, 4 extra bits.
const PRETREE_ZERO_RUN: usize = 17;
/// Pretree symbol: longer run of zero lengths.
const PRETREE_LONG_ZERO_RUN: usize = 18;
/// Pretree symbol: repeat a delta-coded length.
const PRETREE_REPEAT: usize = 19;

/// Longest single match the format can emit (base 192 + 3 + 63 extra).
/// Destination buffers carry this much slack so a match crossing the section
/// threshold cannot write out of bounds.
pub const MAX_MATCH_LENGTH: usize = 258;

/// Per-block decode state: the three Huffman tables plus the section and
/// sticky-offset registers.
pub struct LzxDecoder {
    offsets: HuffmanTable,
    pretree: HuffmanTable,
    literals: HuffmanTable,
    method: u32,
    section_length: usize,
    last_offset: u32,
    literals_built: bool,
}

impl Default for LzxDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LzxDecoder {
    pub fn new() -> Self {
        Self {
            offsets: HuffmanTable::new(7, 8, 128),
            pretree: HuffmanTable::new(6, 20, 96),
            literals: HuffmanTable::new(12, 768, 5120),
            method: 0,
            section_length: 0,
            last_offset: 1,
            literals_built: false,
        }
    }

    /// Bytes the current literal section will produce before the next
    /// section header.
    pub fn section_length(&self) -> usize {
        self.section_length
    }

    /// Read one section header: method, optional offset-tree refresh, the
    /// 24-bit section length, and (methods 2 and 3) the literal-tree refresh.
    pub fn read_literal_table(&mut self, src: &mut BitReader<'_>) -> Result<()> {
        self.method = u32::from(src.read_bits(3)?);
        match self.method {
            1 | 2 | 3 => {}
            _ => return Err(LzxError::UnknownCompression),
        }

        if self.method == 3 {
            for index in 0..8 {
                self.offsets.bit_lengths[index] = src.read_bits(3)? as u8;
            }
            self.offsets.rebuild()?;
        }

        self.section_length = (usize::from(src.read_bits(8)?) << 16)
            | (usize::from(src.read_bits(8)?) << 8)
            | usize::from(src.read_bits(8)?);

        if self.method == 1 {
            // "Literals only": keep the previous tables. A stream cannot ask
            // for that before any table exists.
            if !self.literals_built {
                return Err(LzxError::HuffmanTableError);
            }
            return Ok(());
        }

        self.refresh_literal_tree(src)?;
        self.literals_built = true;
        Ok(())
    }

    /// Rebuild the 768-symbol literal tree in two passes (the 256 byte
    /// symbols, then the 512 match symbols), each prefixed by a fresh
    /// pretree.
    fn refresh_literal_tree(&mut self, src: &mut BitReader<'_>) -> Result<()> {
        let mut pos = 0usize;
        let mut pass_fix = 1usize;
        let mut max_symbol = 256usize;

        loop {
            for index in 0..20 {
                self.pretree.bit_lengths[index] = src.read_bits(4)? as u8;
            }
            self.pretree.rebuild()?;

            while pos < max_symbol {
                let symbol = usize::from(self.pretree.decode_symbol(src)?);
                match symbol {
                    PRETREE_ZERO_RUN | PRETREE_LONG_ZERO_RUN => {
                        let (extra_bits, base) = if symbol == PRETREE_ZERO_RUN {
                            (4, 3)
                        } else {
                            (6 - pass_fix as u32, 19)
                        };
                        let mut count = base + usize::from(src.read_bits(extra_bits)?) + pass_fix;
                        while pos < max_symbol && count > 0 {
                            self.literals.bit_lengths[pos] = 0;
                            pos += 1;
                            count -= 1;
                        }
                    }
                    PRETREE_REPEAT => {
                        let mut count = usize::from(src.read_bits(1)?) + 3 + pass_fix;
                        let delta = usize::from(self.pretree.decode_symbol(src)?);
                        let value = Self::apply_delta(self.literals.bit_lengths[pos], delta)?;
                        while pos < max_symbol && count > 0 {
                            self.literals.bit_lengths[pos] = value;
                            pos += 1;
                            count -= 1;
                        }
                    }
                    _ => {
                        let value = Self::apply_delta(self.literals.bit_lengths[pos], symbol)?;
                        self.literals.bit_lengths[pos] = value;
                        pos += 1;
                    }
                }
            }

            max_symbol += 512;
            if max_symbol != 768 {
                break;
            }
            pass_fix -= 1;
        }

        self.literals.rebuild()
    }

    fn apply_delta(old_length: u8, delta_symbol: usize) -> Result<u8> {
        (usize::from(old_length) + 17)
            .checked_sub(delta_symbol)
            .and_then(|index| MOD17.get(index).copied())
            .ok_or(LzxError::HuffmanTableError)
    }

    /// Decode symbols into `dest[*pos..]` until `*pos` reaches `end` or the
    /// input runs dry.
    ///
    /// `dest` must extend at least [`MAX_MATCH_LENGTH`] bytes past `end`: a
    /// match decoded just before the threshold legitimately finishes beyond
    /// it, and the caller truncates the excess.
    pub fn decrunch(
        &mut self,
        src: &mut BitReader<'_>,
        dest: &mut [u8],
        pos: &mut usize,
        end: usize,
    ) -> Result<()> {
        while *pos < end {
            if src.is_eof() && src.pending_bits() == 0 {
                break;
            }

            let symbol = usize::from(self.literals.decode_symbol(src)?);
            if symbol < 256 {
                *dest.get_mut(*pos).ok_or(LzxError::BufferOverflow)? = symbol as u8;
                *pos += 1;
                continue;
            }

            let match_symbol = symbol - 256;

            let offset_slot = match_symbol & 31;
            let mut offset = OFFSET_BASE[offset_slot];
            let extra_bits = EXTRA_BITS[offset_slot];
            if extra_bits >= 3 && self.method == 3 {
                // Aligned offset: the low three bits travel through the
                // offsets tree instead of the raw stream.
                if extra_bits > 3 {
                    offset += u32::from(src.read_bits(extra_bits - 3)?) << 3;
                }
                offset += u32::from(self.offsets.decode_symbol(src)?);
            } else {
                if extra_bits > 0 {
                    offset += u32::from(src.read_bits(extra_bits)?);
                }
                if offset == 0 {
                    offset = self.last_offset;
                }
            }
            self.last_offset = offset;

            let length_slot = (match_symbol >> 5) & 15;
            let mut length = LENGTH_BASE[length_slot] as usize + 3;
            let length_extra = EXTRA_BITS[length_slot];
            if length_extra > 0 {
                length += usize::from(src.read_bits(length_extra)?);
            }

            let offset = offset as usize;
            if offset > *pos {
                // The back-reference points before the first byte this block
                // has produced.
                return Err(LzxError::OutOfRange);
            }
            if *pos + length > dest.len() {
                return Err(LzxError::BufferOverflow);
            }

            // Forward byte-by-byte copy: overlapping matches (offset shorter
            // than length) must re-read bytes written earlier in the same
            // copy so the repeated pattern propagates.
            let mut from = *pos - offset;
            for _ in 0..length {
                dest[*pos] = dest[from];
                *pos += 1;
                from += 1;
            }
        }
        Ok(())
    }
}
