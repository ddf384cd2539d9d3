//! E2E: every failure path a damaged archive can take.

mod common;

use common::{
    compress_literals, entry_header, store_archive, BitWriter, EntrySpec, INFO_HEADER,
};
use lzx::{Archive, LzxError};

// ─────────────────────────────────────────────────────────────────────────────
// Opening
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn bad_magic() {
    for bytes in [
        b"LZY\x00\x00\x00\x00\x00\x00\x00".as_slice(),
        b"XZL\x00\x00\x00\x00\x00\x00\x00".as_slice(),
        b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00".as_slice(),
    ] {
        assert_eq!(Archive::open(bytes).unwrap_err(), LzxError::NotLzxFile);
    }
}

#[test]
fn short_info_header() {
    assert_eq!(Archive::open(b"LZX").unwrap_err(), LzxError::UnexpectedEof);
    assert_eq!(Archive::open(b"").unwrap_err(), LzxError::UnexpectedEof);
}

/// Flipping any single bit of the fixed header, the filename, or the comment
/// fails the header CRC and aborts the whole open.
#[test]
fn header_tampering_aborts_open() {
    let payload = b"payload";
    let mut pristine = INFO_HEADER.to_vec();
    pristine.extend(entry_header(&EntrySpec {
        comment: b"note",
        ..EntrySpec::store(b"file.bin", payload)
    }));
    pristine.extend_from_slice(payload);
    assert!(Archive::open(&pristine).is_ok());

    let header_start = INFO_HEADER.len();
    let header_len = common::ENTRY_HEADER_SIZE + b"file.bin".len() + b"note".len();
    for byte_at in header_start..header_start + header_len {
        for bit in 0..8 {
            let mut tampered = pristine.clone();
            tampered[byte_at] ^= 1 << bit;
            let result = Archive::open(&tampered);
            // Most flips fail the CRC; flips inside the length fields can
            // surface as a short read instead. Either way, open must fail.
            let err = result.err().expect("tampered archive opened cleanly");
            assert!(
                err == LzxError::ChecksumInvalid || err == LzxError::UnexpectedEof,
                "unexpected error {:?} for flip at byte {} bit {}",
                err,
                byte_at,
                bit
            );
        }
    }
}

#[test]
fn payload_longer_than_file_is_eof() {
    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        name: b"liar.bin",
        unpack_size: 100,
        pack_size: 100,
        mode: 0,
        flags: 0,
        data_crc: 0,
        attributes: 0,
        comment: b"",
        date_raw: 0,
    }));
    bytes.extend_from_slice(&[0u8; 10]); // far fewer than the declared 100
    assert_eq!(Archive::open(&bytes).unwrap_err(), LzxError::UnexpectedEof);
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────────────────────────

fn normal_archive_with_payload(unpack_size: u32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        name: b"x",
        unpack_size,
        pack_size: payload.len() as u32,
        mode: 2,
        flags: 0,
        data_crc: 0,
        attributes: 0,
        comment: b"",
        date_raw: 0,
    }));
    bytes.extend_from_slice(payload);
    bytes
}

/// An underfull pretree (Kraft sum below one) must be rejected when the
/// block is first decoded.
#[test]
fn incomplete_pretree_fails_lazily() {
    let mut writer = BitWriter::new();
    writer.write_bits(2, 3); // method 2, no offsets refresh
    writer.write_bits(0, 8);
    writer.write_bits(0, 8);
    writer.write_bits(4, 8);
    // Pretree lengths: a single 1-bit code — incomplete.
    for symbol in 0..20u16 {
        writer.write_bits(u16::from(symbol == 7), 4);
    }
    let payload = writer.finish();

    let archive_bytes = normal_archive_with_payload(4, &payload);
    let archive = Archive::open(&archive_bytes).unwrap();
    let entry = archive.entry("x").unwrap();
    assert_eq!(entry.bytes().unwrap_err(), LzxError::HuffmanTableError);
    // The failure is cached on the block.
    assert_eq!(entry.bytes().unwrap_err(), LzxError::HuffmanTableError);
}

/// Section method 1 ("keep previous tables") at the start of a block has no
/// tables to keep.
#[test]
fn method_one_first_fails() {
    let mut writer = BitWriter::new();
    writer.write_bits(1, 3);
    writer.write_bits(0, 8);
    writer.write_bits(0, 8);
    writer.write_bits(4, 8);
    let payload = writer.finish();

    let archive_bytes = normal_archive_with_payload(4, &payload);
    let archive = Archive::open(&archive_bytes).unwrap();
    assert_eq!(
        archive.entry("x").unwrap().bytes().unwrap_err(),
        LzxError::HuffmanTableError
    );
}

/// Section method values outside {1, 2, 3}.
#[test]
fn unknown_section_method_fails() {
    let mut writer = BitWriter::new();
    writer.write_bits(5, 3);
    let payload = writer.finish();

    let archive_bytes = normal_archive_with_payload(4, &payload);
    let archive = Archive::open(&archive_bytes).unwrap();
    assert_eq!(
        archive.entry("x").unwrap().bytes().unwrap_err(),
        LzxError::UnknownCompression
    );
}

/// An entry whose header declares an unsupported compression mode parses
/// fine and fails at decode time.
#[test]
fn unknown_entry_mode_fails_at_decode() {
    let payload = b"????";
    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        name: b"odd.bin",
        unpack_size: 4,
        pack_size: 4,
        mode: 5,
        flags: 0,
        data_crc: 0,
        attributes: 0,
        comment: b"",
        date_raw: 0,
    }));
    bytes.extend_from_slice(payload);

    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(
        archive.entry("odd.bin").unwrap().bytes().unwrap_err(),
        LzxError::UnknownCompression
    );
}

/// An empty normal-mode payload cannot produce the declared bytes.
#[test]
fn empty_payload_is_eof() {
    let archive_bytes = normal_archive_with_payload(8, &[]);
    let archive = Archive::open(&archive_bytes).unwrap();
    assert_eq!(
        archive.entry("x").unwrap().bytes().unwrap_err(),
        LzxError::UnexpectedEof
    );
}

/// Damage in one entry's block leaves the others readable.
#[test]
fn damage_is_contained_per_block() {
    let good_payload = b"good bytes";
    let mut bytes = store_archive(&[(b"good.bin", good_payload)]);
    let bad_stream = compress_literals(b"doomed");
    bytes.extend(entry_header(&EntrySpec {
        name: b"bad.bin",
        unpack_size: 6,
        pack_size: bad_stream.len() as u32,
        mode: 2,
        flags: 0,
        data_crc: 0,
        attributes: 0,
        comment: b"",
        date_raw: 0,
    }));
    // Corrupt the method bits of the stream before appending; they sit in
    // the second byte of the first big-endian word.
    let mut corrupted = bad_stream.clone();
    corrupted[1] = 0xFF;
    bytes.extend_from_slice(&corrupted);

    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(
        archive.entry("bad.bin").unwrap().bytes().unwrap_err(),
        LzxError::UnknownCompression
    );
    assert_eq!(archive.entry("good.bin").unwrap().bytes().unwrap(), good_payload);
}
