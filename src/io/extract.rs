//! Writing entries out to the filesystem.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use filetime::FileTime;

use crate::archive::Entry;
use crate::crc::crc32;
use crate::error::{LzxError, Result};

/// Knobs for [`extract_entry`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory extracted files are created under.
    pub output_dir: PathBuf,
    /// Replace existing files instead of failing on them.
    pub overwrite: bool,
    /// Set each file's modification time from the archive datestamp.
    pub restore_datestamps: bool,
    /// Check the decompressed bytes against the declared data CRC-32.
    pub verify_crc: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overwrite: true,
            restore_datestamps: true,
            verify_crc: true,
        }
    }
}

/// Resolve the on-disk path for an entry under `base`.
///
/// The stored name uses `/` separators. Absolute prefixes and parent-dir
/// components are dropped so an archive can never write outside `base`.
pub fn entry_output_path(base: &Path, entry: &Entry<'_>) -> PathBuf {
    let name = entry.name();
    let mut path = base.to_path_buf();
    for part in name.split('/') {
        let part = Path::new(part);
        for component in part.components() {
            if let Component::Normal(component) = component {
                path.push(component);
            }
        }
    }
    path
}

/// Decompress one entry and write it under `options.output_dir`.
///
/// Returns the path written. Parent directories are created as needed; the
/// datestamp is restored best-effort after the contents are on disk.
pub fn extract_entry(entry: &Entry<'_>, options: &ExtractOptions) -> Result<PathBuf> {
    let bytes = entry.bytes()?;

    if options.verify_crc && crc32(&bytes) != entry.data_crc() {
        return Err(LzxError::ChecksumInvalid);
    }

    let path = entry_output_path(&options.output_dir, entry);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|_| LzxError::FileCreateError)?;
    }
    if !options.overwrite && path.exists() {
        return Err(LzxError::FileCreateError);
    }

    let mut file = fs::File::create(&path).map_err(|_| LzxError::FileCreateError)?;
    file.write_all(&bytes).map_err(|_| LzxError::FileWriteError)?;
    drop(file);

    if options.restore_datestamps {
        let mtime = FileTime::from_unix_time(entry.datestamp().to_unix_seconds(), 0);
        // Metadata restore is cosmetic; the extracted bytes matter more than
        // a timestamp the filesystem may refuse.
        let _ = filetime::set_file_mtime(&path, mtime);
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Archive;
    use crate::io::tests::{store_archive, store_archive_with};

    #[test]
    fn extracts_bytes_and_creates_directories() {
        let bytes = store_archive(&[("sub/dir/file.bin", b"payload")]);
        let archive = Archive::open(&bytes).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let options = ExtractOptions {
            output_dir: dir.path().to_path_buf(),
            ..ExtractOptions::default()
        };
        let entry = archive.entry("sub/dir/file.bin").unwrap();
        let written = extract_entry(entry, &options).unwrap();

        assert_eq!(written, dir.path().join("sub/dir/file.bin"));
        assert_eq!(fs::read(&written).unwrap(), b"payload");
    }

    #[test]
    fn restores_datestamp_as_mtime() {
        // 1995-07-14 13:45:59 packed: day 14, month 7, year 25, 13:45:59.
        let stamp = (14u32 << 27) | (7 << 23) | (25 << 17) | (13 << 12) | (45 << 6) | 59;
        let bytes = store_archive_with(&[("dated.bin", b"x", stamp)]);
        let archive = Archive::open(&bytes).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let options = ExtractOptions {
            output_dir: dir.path().to_path_buf(),
            ..ExtractOptions::default()
        };
        let written = extract_entry(archive.entry("dated.bin").unwrap(), &options).unwrap();

        let metadata = fs::metadata(&written).unwrap();
        let mtime = FileTime::from_last_modification_time(&metadata);
        assert_eq!(
            mtime.unix_seconds(),
            archive.entry("dated.bin").unwrap().datestamp().to_unix_seconds()
        );
    }

    #[test]
    fn corrupt_payload_fails_the_crc_check() {
        // Declared CRC belongs to different bytes.
        let mut raw = store_archive(&[("bad.bin", b"AAAA")]);
        let tail = raw.len() - 1;
        raw[tail] ^= 0xFF; // payload byte, not covered by the header CRC
        let archive = Archive::open(&raw).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let options = ExtractOptions {
            output_dir: dir.path().to_path_buf(),
            ..ExtractOptions::default()
        };
        assert_eq!(
            extract_entry(archive.entry("bad.bin").unwrap(), &options).unwrap_err(),
            LzxError::ChecksumInvalid
        );
    }

    #[test]
    fn hostile_names_stay_under_the_output_dir() {
        let bytes = store_archive(&[("../escape.bin", b"x")]);
        let archive = Archive::open(&bytes).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let entry = archive.entry("../escape.bin").unwrap();
        let path = entry_output_path(dir.path(), entry);
        assert!(path.starts_with(dir.path()));
        assert_eq!(path, dir.path().join("escape.bin"));
    }

    #[test]
    fn keep_mode_refuses_existing_files() {
        let bytes = store_archive(&[("twice.bin", b"abc")]);
        let archive = Archive::open(&bytes).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let mut options = ExtractOptions {
            output_dir: dir.path().to_path_buf(),
            ..ExtractOptions::default()
        };
        let entry = archive.entry("twice.bin").unwrap();
        extract_entry(entry, &options).unwrap();

        options.overwrite = false;
        assert_eq!(extract_entry(entry, &options).unwrap_err(), LzxError::FileCreateError);

        options.overwrite = true;
        extract_entry(entry, &options).unwrap();
    }
}
