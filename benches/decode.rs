//! Criterion benchmarks for archive parsing and block decoding.
//!
//! Run with:
//!   cargo bench --bench decode
//!
//! Archives are fabricated with the same fixture builders the e2e suites
//! use, so the decode benchmark exercises the real literal path end to end.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lzx::Archive;

mod fixture {
    include!("../e2e/common/mod.rs");
}

fn synthetic_data(len: usize) -> Vec<u8> {
    // Mildly structured bytes: repeating words with a drifting phase, so the
    // literal distribution is not degenerate.
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add((i >> 8) as u8))
        .collect()
}

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");
    for &size in &[4_096usize, 65_536] {
        let data = synthetic_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| lzx::crc32(data))
        });
    }
    group.finish();
}

fn bench_directory_parse(c: &mut Criterion) {
    // Many small store entries: measures header parse + CRC validation.
    let payload = b"0123456789abcdef";
    let names: Vec<String> = (0..256).map(|i| format!("entry{:03}.bin", i)).collect();
    let entries: Vec<(&[u8], &[u8])> = names
        .iter()
        .map(|name| (name.as_bytes(), payload.as_slice()))
        .collect();
    let archive_bytes = fixture::store_archive(&entries);

    c.bench_function("directory_parse_256_entries", |b| {
        b.iter(|| Archive::open(&archive_bytes).unwrap().len())
    });
}

fn bench_block_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_decode");
    for &size in &[16_384usize, 65_536] {
        let data = synthetic_data(size);
        let archive_bytes = fixture::compressed_archive(b"bench.bin", &data);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &archive_bytes,
            |b, archive_bytes| {
                b.iter(|| {
                    // Re-open each round: the block memoises its result, and
                    // the decode is what's being measured.
                    let archive = Archive::open(archive_bytes).unwrap();
                    archive.entries()[0].bytes().unwrap().len()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_crc32, bench_directory_parse, bench_block_decode);
criterion_main!(benches);
