//! E2E: normal-mode (compressed) entries through the public API.
//!
//! Streams are fabricated by the literal-only packer in `common`, plus
//! hand-written match symbols where the LZ77 paths need exercising.

mod common;

use common::{
    compressed_archive, entry_header, write_literal_symbol, write_uniform_section_header,
    BitWriter, EntrySpec, INFO_HEADER,
};
use lzx::{crc32, Archive, LzxError};

fn archive_with_payload(name: &[u8], data_len: usize, data_crc: u32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = INFO_HEADER.to_vec();
    bytes.extend(entry_header(&EntrySpec {
        name,
        unpack_size: data_len as u32,
        pack_size: payload.len() as u32,
        mode: 2,
        flags: 0,
        data_crc,
        attributes: 0x0F,
        comment: b"",
        date_raw: 0,
    }));
    bytes.extend_from_slice(payload);
    bytes
}

// ─────────────────────────────────────────────────────────────────────────────
// Literal streams
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn compressed_entry_decodes_and_validates() {
    let data = b"The LZX format compresses whole runs of files into one block.";
    let bytes = compressed_archive(b"readme.txt", data);

    let archive = Archive::open(&bytes).unwrap();
    let entry = archive.entry("readme.txt").unwrap();
    let decoded = entry.bytes().unwrap();
    assert_eq!(decoded, data);
    assert_eq!(crc32(&decoded), entry.data_crc());
}

#[test]
fn all_byte_values_roundtrip() {
    let data: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
    let bytes = compressed_archive(b"bytes.bin", &data);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.entry("bytes.bin").unwrap().bytes().unwrap(), data);
}

/// Multiple literal sections inside one block: the decoder must refresh its
/// tables at each section boundary.
#[test]
fn multi_section_stream() {
    let first = b"section one, ";
    let second = b"section two.";
    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, first.len(), 3);
    for &byte in first {
        write_literal_symbol(&mut writer, u16::from(byte));
    }
    write_uniform_section_header(&mut writer, second.len(), 3);
    for &byte in second {
        write_literal_symbol(&mut writer, u16::from(byte));
    }
    let payload = writer.finish();

    let mut data = first.to_vec();
    data.extend_from_slice(second);
    let bytes = archive_with_payload(b"two.txt", data.len(), crc32(&data), &payload);

    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.entry("two.txt").unwrap().bytes().unwrap(), data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Match symbols
// ─────────────────────────────────────────────────────────────────────────────

/// An overlapping match replicates its own output: "AB" + match(offset 2,
/// length 4) must give "ABABAB".
#[test]
fn overlapping_match_replicates() {
    let expected = b"ABABAB";
    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, expected.len(), 3);
    write_literal_symbol(&mut writer, u16::from(b'A'));
    write_literal_symbol(&mut writer, u16::from(b'B'));
    // Offset slot 2 (base 2), length slot 1 (base 1 + 3 = 4).
    write_literal_symbol(&mut writer, 256 + 2 + (1 << 5));
    let payload = writer.finish();

    let bytes = archive_with_payload(b"rep.bin", expected.len(), crc32(expected), &payload);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.entry("rep.bin").unwrap().bytes().unwrap(), expected);
}

/// Aligned offsets (slot with three-plus extra bits under method 3) read
/// their low bits through the offsets tree.
#[test]
fn aligned_offset_match() {
    let head: Vec<u8> = (b'a'..=b'q').collect(); // 17 bytes
    let mut expected = head.clone();
    expected.extend_from_slice(b"abc"); // offset 17, length 3

    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, expected.len(), 3);
    for &byte in &head {
        write_literal_symbol(&mut writer, u16::from(byte));
    }
    // Offset slot 8: base 16, 3 extra bits, all through the offsets tree.
    write_literal_symbol(&mut writer, 256 + 8);
    writer.write_code(1, 3); // footer symbol 1 → offset 16 + 1
    let payload = writer.finish();

    let bytes = archive_with_payload(b"al.bin", expected.len(), crc32(&expected), &payload);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.entry("al.bin").unwrap().bytes().unwrap(), expected);
}

/// A match may finish past the declared unpack size; the excess must be
/// truncated away.
#[test]
fn overshooting_match_is_truncated() {
    // Declared size 5, but the match writes 2 + 4 = 6 bytes of output.
    let expected = b"ABABA";
    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, 6, 3);
    write_literal_symbol(&mut writer, u16::from(b'A'));
    write_literal_symbol(&mut writer, u16::from(b'B'));
    write_literal_symbol(&mut writer, 256 + 2 + (1 << 5));
    let payload = writer.finish();

    let bytes = archive_with_payload(b"cut.bin", expected.len(), crc32(expected), &payload);
    let archive = Archive::open(&bytes).unwrap();
    let decoded = archive.entry("cut.bin").unwrap().bytes().unwrap();
    assert_eq!(decoded.len(), 5);
    assert_eq!(decoded, expected);
}

/// A match reaching before the block's first byte is a decode error.
#[test]
fn match_before_origin_fails() {
    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, 4, 3);
    write_literal_symbol(&mut writer, 256 + 2 + (1 << 5));
    let payload = writer.finish();

    let bytes = archive_with_payload(b"bad.bin", 4, 0, &payload);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(
        archive.entry("bad.bin").unwrap().bytes().unwrap_err(),
        LzxError::OutOfRange
    );
}

/// A zero-valued match offset reuses the previous one (the sticky offset).
#[test]
fn sticky_offset_roundtrip() {
    // "XY" + match(offset 2, len 4) + sticky match(len 3) = "XYXYXYXYX".
    let expected = b"XYXYXYXYX";
    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, expected.len(), 3);
    write_literal_symbol(&mut writer, u16::from(b'X'));
    write_literal_symbol(&mut writer, u16::from(b'Y'));
    write_literal_symbol(&mut writer, 256 + 2 + (1 << 5));
    write_literal_symbol(&mut writer, 256); // slot 0: offset 0 → previous
    let payload = writer.finish();

    let bytes = archive_with_payload(b"sticky.bin", expected.len(), crc32(expected), &payload);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.entry("sticky.bin").unwrap().bytes().unwrap(), expected);
}

/// Section method 2 rebuilds the literal tree but never the offsets tree;
/// match offsets come straight from the stream.
#[test]
fn method_two_stream() {
    // "abcde" + match(offset 5, length 4) = "abcdeabcd".
    let expected = b"abcdeabcd";
    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, expected.len(), 2);
    for &byte in b"abcde" {
        write_literal_symbol(&mut writer, u16::from(byte));
    }
    // Offset slot 4: base 4 plus one extra bit (set → 5); length slot 1.
    write_literal_symbol(&mut writer, 256 + 4 + (1 << 5));
    writer.write_bits(1, 1);
    let payload = writer.finish();

    let bytes = archive_with_payload(b"m2.bin", expected.len(), crc32(expected), &payload);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.entry("m2.bin").unwrap().bytes().unwrap(), expected);
}

/// A longer stream mixing literals and matches across several offset and
/// length slots; the expected output is replayed with a plain LZ77 model.
#[test]
fn mixed_literals_and_matches() {
    const EXTRA_BITS: [u32; 32] = [
        0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, //
        7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13, 13, 14, 14,
    ];
    const OFFSET_BASE: [u32; 32] = [
        0, 1, 2, 3, 4, 6, 8, 12, 16, 24, 32, 48, 64, 96, 128, 192, //
        256, 384, 512, 768, 1024, 1536, 2048, 3072, //
        4096, 6144, 8192, 12288, 16384, 24576, 32768, 49152,
    ];
    // (offset_slot, offset_extra, length_slot, length_extra); every offset
    // stays within the bytes produced before it. Slot 0 is the sticky case.
    let matches: [(u16, u16, u16, u16); 6] = [
        (3, 0, 0, 0),   // offset 3, length 3
        (6, 2, 2, 0),   // offset 10, length 5
        (7, 3, 4, 1),   // offset 15, length 8
        (10, 11, 5, 0), // offset 43, length 9
        (12, 20, 7, 3), // offset 84, length 18
        (0, 0, 1, 0),   // offset reused (84), length 4
    ];

    let mut expected: Vec<u8> = (0..64u32).map(|i| (i * 7 % 251) as u8).collect();

    // Section length is the final output size; length slots use the first
    // sixteen offset bases.
    let total = 64
        + matches
            .iter()
            .map(|&(_, _, ls, le)| OFFSET_BASE[ls as usize] as usize + 3 + le as usize)
            .sum::<usize>();

    let mut writer = BitWriter::new();
    write_uniform_section_header(&mut writer, total, 2);
    for &byte in expected.clone().iter() {
        write_literal_symbol(&mut writer, u16::from(byte));
    }

    let mut last_offset = 1usize;
    for (offset_slot, offset_extra, length_slot, length_extra) in matches {
        write_literal_symbol(&mut writer, 256 + offset_slot + (length_slot << 5));
        let offset_bits = EXTRA_BITS[offset_slot as usize];
        if offset_bits > 0 {
            writer.write_bits(offset_extra, offset_bits);
        }
        let length_bits = EXTRA_BITS[length_slot as usize];
        if length_bits > 0 {
            writer.write_bits(length_extra, length_bits);
        }

        // Replay the match into the expected output.
        let mut offset = OFFSET_BASE[offset_slot as usize] as usize + offset_extra as usize;
        if offset == 0 {
            offset = last_offset;
        }
        last_offset = offset;
        let length = OFFSET_BASE[length_slot as usize] as usize + 3 + length_extra as usize;
        for _ in 0..length {
            let byte = expected[expected.len() - offset];
            expected.push(byte);
        }
    }
    assert_eq!(expected.len(), total);
    let payload = writer.finish();

    let bytes = archive_with_payload(b"mixed.bin", total, crc32(&expected), &payload);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(archive.entry("mixed.bin").unwrap().bytes().unwrap(), expected);
}

// ─────────────────────────────────────────────────────────────────────────────
// Stream exhaustion
// ─────────────────────────────────────────────────────────────────────────────

/// A payload that ends before the declared output is produced.
#[test]
fn truncated_stream_is_eof() {
    let data = b"plenty of bytes that will not all be present";
    let full = common::compress_literals(data);
    let truncated = &full[..full.len() / 2];

    let bytes = archive_with_payload(b"trunc.bin", data.len(), crc32(data), truncated);
    let archive = Archive::open(&bytes).unwrap();
    assert_eq!(
        archive.entry("trunc.bin").unwrap().bytes().unwrap_err(),
        LzxError::UnexpectedEof
    );
}
