//! Amiga LZX archive reading.
//!
//! The decoder core lives in [`archive`], [`bitstream`], [`crc`], and
//! [`huffman`]; the filesystem collaborators (byte source, listing,
//! extraction) in [`io`]; the command-line front end in [`cli`].
//!
//! Typical use:
//!
//! ```no_run
//! use lzx::{Archive, io::ArchiveFile};
//!
//! # fn main() -> anyhow::Result<()> {
//! let file = ArchiveFile::open("games.lzx".as_ref())?;
//! let archive = Archive::open(file.bytes())?;
//! for entry in archive.entries() {
//!     println!("{:>9} {}", entry.unpack_size(), entry.name());
//!     let bytes = entry.bytes()?;
//!     // write bytes somewhere...
//!     # let _ = bytes;
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod bitstream;
pub mod cli;
pub mod crc;
pub mod error;
pub mod huffman;
pub mod io;

pub use archive::{
    latin1_to_string, Archive, ArchiveFlags, Block, CompressionMode, DateStamp, Entry, EntryHeader,
    HeaderFlags, MachineType, ProtectionBits, Segment,
};
pub use bitstream::BitReader;
pub use crc::{crc32, Crc32};
pub use error::{LzxError, Result};
pub use huffman::{HuffmanTable, LzxDecoder};
