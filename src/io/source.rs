//! Archive byte source.
//!
//! The decoder core only needs a read-only, length-known byte slice; this
//! module supplies one from a path. Archives are memory-mapped when
//! possible, with a plain read into memory as the fallback (empty files and
//! exotic filesystems refuse mappings).

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{LzxError, Result};

#[derive(Debug)]
enum Backing {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

/// An opened archive file, addressable as one byte slice.
#[derive(Debug)]
pub struct ArchiveFile {
    backing: Backing,
}

impl ArchiveFile {
    /// Open and map `path` read-only, falling back to reading the whole file
    /// into memory when mapping fails.
    pub fn open(path: &Path) -> Result<ArchiveFile> {
        let file = File::open(path).map_err(|_| LzxError::FileOpenError)?;
        // SAFETY: the mapping is private and read-only; the underlying file
        // is treated as immutable for the mapping's lifetime, as the archive
        // format requires.
        let backing = match unsafe { Mmap::map(&file) } {
            Ok(map) => Backing::Mapped(map),
            Err(_) => Backing::Buffered(std::fs::read(path).map_err(|_| LzxError::FileMapError)?),
        };
        Ok(ArchiveFile { backing })
    }

    /// Read `path` entirely into memory, never mapping.
    pub fn read(path: &Path) -> Result<ArchiveFile> {
        let bytes = std::fs::read(path).map_err(|_| LzxError::FileOpenError)?;
        Ok(ArchiveFile { backing: Backing::Buffered(bytes) })
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(map) => map,
            Backing::Buffered(bytes) => bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_maps_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"LZX archive bytes").unwrap();
        file.flush().unwrap();
        let source = ArchiveFile::open(file.path()).unwrap();
        assert_eq!(source.bytes(), b"LZX archive bytes");
    }

    #[test]
    fn read_fallback_matches() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        file.flush().unwrap();
        let source = ArchiveFile::read(file.path()).unwrap();
        assert_eq!(source.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.lzx");
        assert_eq!(ArchiveFile::open(&missing).unwrap_err(), LzxError::FileOpenError);
    }

    #[test]
    fn empty_file_opens() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = ArchiveFile::open(file.path()).unwrap();
        assert!(source.bytes().is_empty());
    }
}
