//! E2E: merge groups — several entries sharing one compressed block.

mod common;

use common::{compress_literals, entry_header, merged_archive, EntrySpec, INFO_HEADER};
use lzx::{crc32, Archive, LzxError};
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Grouping and slicing
// ─────────────────────────────────────────────────────────────────────────────

/// Two merged entries in one normal-mode block: each gets its own slice of
/// the shared decompressed buffer, and the block is decoded exactly once.
#[test]
fn merged_pair_shares_one_block() {
    let bytes = merged_archive(&[(b"first.txt", b"alpha bytes"), (b"second.txt", b"beta!")]);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.len(), 2);

    let first = archive.entry("first.txt").unwrap();
    let second = archive.entry("second.txt").unwrap();
    assert!(first.is_merged());
    assert!(second.is_merged());
    assert!(Arc::ptr_eq(
        first.segments()[0].block(),
        second.segments()[0].block()
    ));

    assert_eq!(first.bytes().unwrap(), b"alpha bytes");
    assert_eq!(second.bytes().unwrap(), b"beta!");
    assert_eq!(crc32(&first.bytes().unwrap()), first.data_crc());
    assert_eq!(crc32(&second.bytes().unwrap()), second.data_crc());

    // Same cached buffer behind both entries: decompress ran once.
    assert_eq!(first.segments()[0].block().total_unpacked_size(), 16);
    let via_first = first.segments()[0].block().data().unwrap().as_ptr();
    let via_second = second.segments()[0].block().data().unwrap().as_ptr();
    assert_eq!(via_first, via_second);
}

/// Segments partition the block contiguously in declaration order.
#[test]
fn segments_partition_the_block() {
    let members: [(&[u8], &[u8]); 3] =
        [(b"a", b"12345"), (b"b", b"678"), (b"c", b"90abcd")];
    let bytes = merged_archive(&members);
    let archive = Archive::open(&bytes).unwrap();

    let mut expected_offset = 0usize;
    for (name, data) in members {
        let entry = archive.entry_by_bytes(name).unwrap();
        let segment = &entry.segments()[0];
        assert_eq!(segment.offset(), expected_offset);
        assert_eq!(segment.length(), data.len());
        assert_eq!(segment.data().unwrap(), data);
        expected_offset += data.len();
    }
    let block = archive.entries()[0].segments()[0].block();
    assert_eq!(block.total_unpacked_size(), expected_offset);
}

/// The leader itself may be merged; a three-member run ends at the first
/// entry with a non-zero pack size.
#[test]
fn leader_closes_the_run() {
    let bytes = merged_archive(&[(b"x", b"XX"), (b"y", b"YYY"), (b"z", b"ZZZZ")]);
    let archive = Archive::open(&bytes).unwrap();
    // The leader (last member) declares the payload; the others declare none.
    assert!(archive.entry("z").unwrap().metadata().pack_size > 0);
    assert_eq!(archive.entry("x").unwrap().metadata().pack_size, 0);
    assert_eq!(archive.entry("y").unwrap().metadata().pack_size, 0);
    assert_eq!(archive.entry("z").unwrap().bytes().unwrap(), b"ZZZZ");
}

// ─────────────────────────────────────────────────────────────────────────────
// Pack-size estimation
// ─────────────────────────────────────────────────────────────────────────────

/// Merged entries apportion the block's packed size by their share of the
/// decompressed total.
#[test]
fn merged_pack_size_is_apportioned() {
    let bytes = merged_archive(&[(b"big", &[b'Q'; 600]), (b"small", &[b'q'; 200])]);
    let archive = Archive::open(&bytes).unwrap();

    let block_packed = archive.entries()[0].segments()[0].block().pack_size();
    let big = archive.entry("big").unwrap().pack_size().unwrap();
    let small = archive.entry("small").unwrap().pack_size().unwrap();

    assert_eq!(big, (0.75 * block_packed as f64) as u64);
    assert_eq!(small, (0.25 * block_packed as f64) as u64);
}

// ─────────────────────────────────────────────────────────────────────────────
// Error paths
// ─────────────────────────────────────────────────────────────────────────────

/// A merge run that reaches end-of-archive without a leader is ill-formed.
#[test]
fn merged_run_without_leader_fails() {
    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        name: b"dangling",
        unpack_size: 8,
        pack_size: 0,
        mode: 2,
        flags: 1,
        data_crc: 0,
        attributes: 0,
        comment: b"",
        date_raw: 0,
    }));
    assert_eq!(Archive::open(&bytes).unwrap_err(), LzxError::UnexpectedEof);
}

/// A damaged shared block fails every consumer with the same cached error.
#[test]
fn shared_block_failure_is_cached() {
    // Build a merged pair, then corrupt the block payload's first word so
    // the section header declares an unknown method. The stream is read as
    // big-endian words with the low bits first, so the method bits sit in
    // the word's second byte.
    let mut bytes = merged_archive(&[(b"one", b"11111"), (b"two", b"22222")]);
    let payload_at = bytes.len() - compress_literals(b"1111122222").len();
    bytes[payload_at + 1] = 0xFF; // method bits become 7

    let archive = Archive::open(&bytes).unwrap();
    let one = archive.entry("one").unwrap();
    let two = archive.entry("two").unwrap();
    assert_eq!(one.bytes().unwrap_err(), LzxError::UnknownCompression);
    assert_eq!(two.bytes().unwrap_err(), LzxError::UnknownCompression);
    // Asking again changes nothing.
    assert_eq!(one.bytes().unwrap_err(), LzxError::UnknownCompression);
}

/// Merged entries under store mode slice the raw payload.
#[test]
fn merged_store_mode_slices_payload() {
    let combined = b"headertrailer";
    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        name: b"head",
        unpack_size: 6,
        pack_size: 0,
        mode: 0,
        flags: 1,
        data_crc: crc32(b"header"),
        attributes: 0,
        comment: b"",
        date_raw: 0,
    }));
    bytes.extend(entry_header(&EntrySpec {
        name: b"tail",
        unpack_size: 7,
        pack_size: combined.len() as u32,
        mode: 0,
        flags: 1,
        data_crc: crc32(b"trailer"),
        attributes: 0,
        comment: b"",
        date_raw: 0,
    }));
    bytes.extend_from_slice(combined);

    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.entry("head").unwrap().bytes().unwrap(), b"header");
    assert_eq!(archive.entry("tail").unwrap().bytes().unwrap(), b"trailer");
}
