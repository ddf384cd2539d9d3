//! Error taxonomy shared by the decoder core and the extraction layer.
//!
//! Every failure the crate can report is one of the field-less kinds below.
//! The four `File*` kinds belong to the filesystem collaborators in
//! [`crate::io`]; the decoder core never raises them.

use core::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LzxError>;

/// Failure kinds for archive parsing, decompression, and extraction.
///
/// The enum is `Copy` so a block can cache its decode failure and hand the
/// same value to every consumer that asks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzxError {
    /// A write would run past the end of a buffer.
    BufferOverflow,
    /// A read would reach before the start of a buffer.
    BufferUnderflow,
    /// A bit count, offset, or index is outside its legal bounds.
    OutOfRange,
    /// A byte-aligned read was attempted while bits are still pending.
    MisalignedData,
    /// The input ended before the structure being read was complete.
    UnexpectedEof,
    /// The file does not start with the `LZX` identifier.
    NotLzxFile,
    /// A computed CRC-32 does not match the value declared in the archive.
    ChecksumInvalid,
    /// A code-length table does not describe a complete prefix code.
    HuffmanTableError,
    /// A compression mode this decoder does not understand.
    UnknownCompression,
    /// Creating an output file failed (extraction layer only).
    FileCreateError,
    /// Writing an output file failed (extraction layer only).
    FileWriteError,
    /// Opening an input file failed (byte-source layer only).
    FileOpenError,
    /// Memory-mapping an input file failed (byte-source layer only).
    FileMapError,
}

impl LzxError {
    /// Short human-readable description, one per kind.
    pub fn message(&self) -> &'static str {
        match self {
            LzxError::BufferOverflow => "buffer overflow",
            LzxError::BufferUnderflow => "buffer underflow",
            LzxError::OutOfRange => "value out of range",
            LzxError::MisalignedData => "misaligned data",
            LzxError::UnexpectedEof => "unexpected end of file",
            LzxError::NotLzxFile => "not an LZX file",
            LzxError::ChecksumInvalid => "checksum invalid",
            LzxError::HuffmanTableError => "huffman table error",
            LzxError::UnknownCompression => "unknown compression mode",
            LzxError::FileCreateError => "cannot create file",
            LzxError::FileWriteError => "cannot write file",
            LzxError::FileOpenError => "cannot open file",
            LzxError::FileMapError => "cannot map file",
        }
    }
}

impl fmt::Display for LzxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for LzxError {}

impl From<LzxError> for std::io::Error {
    fn from(value: LzxError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_distinct() {
        let all = [
            LzxError::BufferOverflow,
            LzxError::BufferUnderflow,
            LzxError::OutOfRange,
            LzxError::MisalignedData,
            LzxError::UnexpectedEof,
            LzxError::NotLzxFile,
            LzxError::ChecksumInvalid,
            LzxError::HuffmanTableError,
            LzxError::UnknownCompression,
            LzxError::FileCreateError,
            LzxError::FileWriteError,
            LzxError::FileOpenError,
            LzxError::FileMapError,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
    }

    #[test]
    fn converts_to_io_error() {
        let err: std::io::Error = LzxError::ChecksumInvalid.into();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
