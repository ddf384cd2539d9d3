//! E2E: extraction to a real filesystem tree through the library io layer.

mod common;

use std::fs;

use common::{compressed_archive, merged_archive, store_archive};
use filetime::FileTime;
use lzx::io::{extract_entry, ExtractOptions};
use lzx::Archive;

fn options_for(dir: &tempfile::TempDir) -> ExtractOptions {
    ExtractOptions {
        output_dir: dir.path().to_path_buf(),
        ..ExtractOptions::default()
    }
}

#[test]
fn extracts_store_and_compressed_entries() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(&dir);

    let stored = store_archive(&[(b"docs/readme.txt", b"stored text")]);
    let archive = Archive::open(&stored).unwrap();
    extract_entry(archive.entry("docs/readme.txt").unwrap(), &options).unwrap();
    assert_eq!(
        fs::read(dir.path().join("docs/readme.txt")).unwrap(),
        b"stored text"
    );

    let data = b"compressed contents travel through the whole decoder";
    let compressed = compressed_archive(b"deep/nested/dir/file.bin", data);
    let archive = Archive::open(&compressed).unwrap();
    extract_entry(archive.entry("deep/nested/dir/file.bin").unwrap(), &options).unwrap();
    assert_eq!(
        fs::read(dir.path().join("deep/nested/dir/file.bin")).unwrap(),
        data
    );
}

#[test]
fn extracts_every_member_of_a_merge_group() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(&dir);

    let bytes = merged_archive(&[
        (b"part1.txt", b"one shared"),
        (b"part2.txt", b" block of"),
        (b"part3.txt", b" bytes"),
    ]);
    let archive = Archive::open(&bytes).unwrap();
    for entry in archive.entries() {
        extract_entry(entry, &options).unwrap();
    }

    assert_eq!(fs::read(dir.path().join("part1.txt")).unwrap(), b"one shared");
    assert_eq!(fs::read(dir.path().join("part2.txt")).unwrap(), b" block of");
    assert_eq!(fs::read(dir.path().join("part3.txt")).unwrap(), b" bytes");
}

#[test]
fn restores_modification_times() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(&dir);

    // 2001-04-03 12:00:00: day 3, month 4, year 31.
    let date_raw = (3u32 << 27) | (4 << 23) | (31 << 17) | (12 << 12);
    let mut bytes = common::INFO_HEADER.to_vec();
    bytes.extend(common::entry_header(&common::EntrySpec {
        date_raw,
        ..common::EntrySpec::store(b"old.txt", b"aged")
    }));
    bytes.extend_from_slice(b"aged");

    let archive = Archive::open(&bytes).unwrap();
    let entry = archive.entry("old.txt").unwrap();
    let written = extract_entry(entry, &options).unwrap();

    let metadata = fs::metadata(written).unwrap();
    let mtime = FileTime::from_last_modification_time(&metadata);
    assert_eq!(mtime.unix_seconds(), entry.datestamp().to_unix_seconds());
}

#[test]
fn keep_mode_preserves_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = options_for(&dir);

    let bytes = store_archive(&[(b"file.txt", b"from archive")]);
    let archive = Archive::open(&bytes).unwrap();
    let entry = archive.entry("file.txt").unwrap();

    fs::write(dir.path().join("file.txt"), b"pre-existing").unwrap();
    options.overwrite = false;
    assert!(extract_entry(entry, &options).is_err());
    assert_eq!(fs::read(dir.path().join("file.txt")).unwrap(), b"pre-existing");

    options.overwrite = true;
    extract_entry(entry, &options).unwrap();
    assert_eq!(fs::read(dir.path().join("file.txt")).unwrap(), b"from archive");
}

#[test]
fn crc_mismatch_blocks_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let options = options_for(&dir);

    // Corrupt the stored payload (outside the header CRC's coverage).
    let mut bytes = store_archive(&[(b"broken.bin", b"AAAA")]);
    let at = bytes.len() - 1;
    bytes[at] ^= 0x55;

    let archive = Archive::open(&bytes).unwrap();
    let entry = archive.entry("broken.bin").unwrap();
    assert!(extract_entry(entry, &options).is_err());

    // With verification off the damaged bytes are written as-is.
    let options = ExtractOptions { verify_crc: false, ..options };
    extract_entry(entry, &options).unwrap();
    assert_eq!(fs::read(dir.path().join("broken.bin")).unwrap().len(), 4);
}
