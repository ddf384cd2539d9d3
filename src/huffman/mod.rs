//! Canonical Huffman decoding for the LZX bit stream.
//!
//! [`table`] builds the two-level decode structure from per-symbol code
//! lengths; [`decoder`] owns the three tables a compressed block uses and
//! runs the literal/match symbol loop.

pub mod decoder;
pub mod table;

pub use decoder::LzxDecoder;
pub use table::HuffmanTable;
