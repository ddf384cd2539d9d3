//! E2E: the `unlzx` binary as a black box.
//!
//! Fabricated archives are written to a temp directory and the binary is
//! driven through `std::process::Command`, checking stdout, the extracted
//! tree, and exit codes.

mod common;

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use common::{compressed_archive, merged_archive, store_archive};
use tempfile::TempDir;

/// Locate the `unlzx` binary produced by Cargo.
fn unlzx_bin() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_unlzx") {
        return PathBuf::from(path);
    }
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("unlzx");
    path
}

fn write_archive(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn view_lists_entries_on_stdout() {
    let dir = TempDir::new().unwrap();
    let archive = write_archive(
        &dir,
        "a.lzx",
        &store_archive(&[(b"hello.txt", b"hello"), (b"world.bin", b"world!")]),
    );

    let output = Command::new(unlzx_bin())
        .args(["-v"])
        .arg(&archive)
        .output()
        .expect("failed to run unlzx");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("hello.txt"));
    assert!(stdout.contains("world.bin"));
    assert!(stdout.contains("11 bytes in 2 files"));
}

#[test]
fn view_with_match_filters_entries() {
    let dir = TempDir::new().unwrap();
    let archive = write_archive(
        &dir,
        "a.lzx",
        &store_archive(&[(b"keep.txt", b"1"), (b"drop.bin", b"2")]),
    );

    let output = Command::new(unlzx_bin())
        .args(["-v", "-m", r"\.txt$"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("keep.txt"));
    assert!(!stdout.contains("drop.bin"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn default_action_extracts() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let data = b"extracted through the real binary";
    let archive = write_archive(&dir, "c.lzx", &compressed_archive(b"file.bin", data));

    let status = Command::new(unlzx_bin())
        .arg("-q")
        .arg("-o")
        .arg(&out)
        .arg(&archive)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(fs::read(out.join("file.bin")).unwrap(), data);
}

#[test]
fn extracts_merge_groups() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let archive = write_archive(
        &dir,
        "m.lzx",
        &merged_archive(&[(b"a.txt", b"AAA"), (b"b.txt", b"BBBB")]),
    );

    let status = Command::new(unlzx_bin())
        .args(["-x", "-q", "-o"])
        .arg(&out)
        .arg(&archive)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(fs::read(out.join("a.txt")).unwrap(), b"AAA");
    assert_eq!(fs::read(out.join("b.txt")).unwrap(), b"BBBB");
}

#[test]
fn match_filter_limits_extraction() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let archive = write_archive(
        &dir,
        "f.lzx",
        &store_archive(&[(b"wanted.txt", b"yes"), (b"ignored.dat", b"no")]),
    );

    let status = Command::new(unlzx_bin())
        .args(["-q", "-m", r"\.txt$", "-o"])
        .arg(&out)
        .arg(&archive)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out.join("wanted.txt").exists());
    assert!(!out.join("ignored.dat").exists());
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure modes and exit codes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn missing_archive_fails() {
    let dir = TempDir::new().unwrap();
    let status = Command::new(unlzx_bin())
        .arg("-q")
        .arg(dir.path().join("absent.lzx"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn garbage_archive_fails() {
    let dir = TempDir::new().unwrap();
    let archive = write_archive(&dir, "junk.lzx", b"this is not an archive at all");
    let output = Command::new(unlzx_bin()).arg("-q").arg(&archive).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("not an LZX file"));
}

#[test]
fn invalid_pattern_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let archive = write_archive(&dir, "a.lzx", &store_archive(&[(b"x", b"1")]));
    let status = Command::new(unlzx_bin())
        .args(["-m", "("])
        .arg(&archive)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
}

#[test]
fn no_arguments_is_an_error() {
    let status = Command::new(unlzx_bin()).status().unwrap();
    assert!(!status.success());
}

/// One bad archive among several: the good ones are still processed, and the
/// exit code reports the failure.
#[test]
fn bad_archive_does_not_stop_the_rest() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let good = write_archive(&dir, "good.lzx", &store_archive(&[(b"ok.txt", b"fine")]));
    let bad = write_archive(&dir, "bad.lzx", b"garbage");

    let status = Command::new(unlzx_bin())
        .arg("-q")
        .arg("-o")
        .arg(&out)
        .arg(&bad)
        .arg(&good)
        .status()
        .unwrap();
    assert!(!status.success());
    assert_eq!(fs::read(out.join("ok.txt")).unwrap(), b"fine");
}
