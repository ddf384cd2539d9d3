//! E2E: the archive reading surface.
//!
//! Opens fabricated archives through the public API and checks entry
//! enumeration, lookup, metadata, and store-mode byte access.

mod common;

use common::{entry_header, store_archive, EntrySpec, INFO_HEADER};
use lzx::{crc32, Archive, CompressionMode, MachineType};

// ─────────────────────────────────────────────────────────────────────────────
// Minimal archives
// ─────────────────────────────────────────────────────────────────────────────

/// The ten info-header bytes alone form a valid, empty archive.
#[test]
fn minimal_archive_has_no_entries() {
    let bytes = [0x4C, 0x5A, 0x58, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let archive = Archive::open(&bytes).unwrap();
    assert!(archive.is_empty());
    assert_eq!(archive.entries().len(), 0);
    assert!(!archive.flags().is_damage_protected());
    assert!(!archive.flags().is_locked());
}

/// Info-header flag bits are recorded on the archive.
#[test]
fn info_flags_are_recorded() {
    let mut bytes = INFO_HEADER;
    bytes[3] = 0x03;
    let archive = Archive::open(&bytes).unwrap();
    assert!(archive.flags().is_damage_protected());
    assert!(archive.flags().is_locked());
}

// ─────────────────────────────────────────────────────────────────────────────
// Single store-mode entry (known-answer)
// ─────────────────────────────────────────────────────────────────────────────

/// One stored 3-byte entry named "a.bin": bytes, sizes, and the declared
/// data CRC all round-trip, and the CRC constant matches the known value.
#[test]
fn single_store_entry_roundtrip() {
    let payload = [0x01u8, 0x02, 0x03];
    assert_eq!(crc32(&payload), 0x55BC801D);

    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        attributes: 0,
        ..EntrySpec::store(b"a.bin", &payload)
    }));
    bytes.extend_from_slice(&payload);

    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.len(), 1);

    let entry = archive.entry("a.bin").unwrap();
    assert_eq!(entry.name(), "a.bin");
    assert_eq!(entry.unpack_size(), 3);
    assert_eq!(entry.pack_size(), Some(3));
    assert_eq!(entry.compression_mode(), CompressionMode::Store);
    assert_eq!(entry.machine_type(), MachineType::Amiga);
    assert_eq!(entry.data_crc(), 0x55BC801D);
    assert_eq!(entry.bytes().unwrap(), payload);
    assert_eq!(crc32(&entry.bytes().unwrap()), entry.data_crc());
}

/// Store-mode bytes are the payload verbatim.
#[test]
fn store_entry_bytes_are_verbatim() {
    let bytes = store_archive(&[(b"data.raw", b"exact bytes, no codec")]);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(
        archive.entry("data.raw").unwrap().bytes().unwrap(),
        b"exact bytes, no codec"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Enumeration and lookup
// ─────────────────────────────────────────────────────────────────────────────

/// Entries come back in archive byte order.
#[test]
fn entries_keep_archive_order() {
    let bytes = store_archive(&[
        (b"zz_last_name", b"1"),
        (b"aa_first_name", b"22"),
        (b"mm_middle", b"333"),
    ]);
    let archive = Archive::open(&bytes).unwrap();
    let names: Vec<String> = archive.entries().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["zz_last_name", "aa_first_name", "mm_middle"]);
}

#[test]
fn lookup_by_name_and_bytes() {
    let bytes = store_archive(&[(b"dir/file.txt", b"hi")]);
    let archive = Archive::open(&bytes).unwrap();
    assert!(archive.entry("dir/file.txt").is_some());
    assert!(archive.entry_by_bytes(b"dir/file.txt").is_some());
    assert!(archive.entry("missing").is_none());
}

/// Filenames are Latin-1 octets; the `String` view maps them losslessly.
#[test]
fn latin1_names_survive() {
    let raw_name: &[u8] = b"caf\xE9.txt";
    let bytes = store_archive(&[(raw_name, b"espresso")]);
    let archive = Archive::open(&bytes).unwrap();

    let entry = &archive.entries()[0];
    assert_eq!(entry.name_bytes(), raw_name);
    assert_eq!(entry.name(), "café.txt");
    assert!(archive.entry("café.txt").is_some());
    assert!(archive.entry_by_bytes(raw_name).is_some());
    // A name outside Latin-1 can never match.
    assert!(archive.entry("日本語").is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn datestamp_attributes_and_comment() {
    // 1998-02-22 09:30:00: day 22, month 2, year 28.
    let date_raw = (22u32 << 27) | (2 << 23) | (28 << 17) | (9 << 12) | (30 << 6);
    let payload = b"dated";
    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        attributes: 0x88, // hidden + readable
        comment: b"release notes",
        date_raw,
        ..EntrySpec::store(b"notes.txt", payload)
    }));
    bytes.extend_from_slice(payload);

    let archive = Archive::open(&bytes).unwrap();
    let entry = archive.entry("notes.txt").unwrap();

    let stamp = entry.datestamp();
    assert_eq!(
        (stamp.year(), stamp.month(), stamp.day()),
        (1998, 2, 22)
    );
    assert_eq!((stamp.hour(), stamp.minute(), stamp.second()), (9, 30, 0));

    assert!(entry.attributes().is_hidden());
    assert!(entry.attributes().is_readable());
    assert!(!entry.attributes().is_writable());
    assert_eq!(entry.attributes().to_string(), "h---r---");

    assert_eq!(entry.comment(), "release notes");
    assert!(!entry.is_merged());
}

/// A zero-length entry has empty bytes and a zero data CRC.
#[test]
fn empty_entry() {
    let bytes = store_archive(&[(b"empty", b"")]);
    let archive = Archive::open(&bytes).unwrap();
    let entry = archive.entry("empty").unwrap();
    assert_eq!(entry.unpack_size(), 0);
    assert_eq!(entry.data_crc(), 0);
    assert_eq!(entry.bytes().unwrap(), Vec::<u8>::new());
}

/// Segment lengths always sum to the entry's unpack size.
#[test]
fn segment_sums_match_unpack_sizes() {
    let bytes = store_archive(&[(b"one", b"abc"), (b"two", b"defghij")]);
    let archive = Archive::open(&bytes).unwrap();
    for entry in archive.entries() {
        let sum: u64 = entry.segments().iter().map(|s| s.length() as u64).sum();
        assert_eq!(sum, entry.unpack_size());
    }
}

/// On a well-formed archive mixing store, compressed, and merged entries,
/// every entry's bytes hash to its declared data CRC and every block's
/// buffer length equals its declared total.
#[test]
fn data_crcs_hold_across_a_mixed_archive() {
    let mut bytes = store_archive(&[(b"plain.txt", b"kept verbatim")]);

    // Append a compressed entry and a merged pair to the same archive.
    let compressed = common::compressed_archive(b"packed.bin", b"squeezed through the decoder");
    bytes.extend_from_slice(&compressed[INFO_HEADER.len()..]);
    let merged = common::merged_archive(&[(b"m1", b"shared "), (b"m2", b"payload")]);
    bytes.extend_from_slice(&merged[INFO_HEADER.len()..]);

    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.len(), 4);
    for entry in archive.entries() {
        let data = entry.bytes().unwrap();
        assert_eq!(data.len() as u64, entry.unpack_size());
        assert_eq!(crc32(&data), entry.data_crc(), "entry {}", entry.name());
        for segment in entry.segments() {
            let block = segment.block();
            assert_eq!(block.data().unwrap().len(), block.total_unpacked_size());
        }
    }
}
