//! Benchmarks for a selection of formats.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kompression::{FormatId, compress, decompress};
use std::hint::black_box;

const FORMATS: [FormatId; 8] = [
    FormatId::Lz10,
    FormatId::Lz11,
    FormatId::Yaz0Be,
    FormatId::Lzss,
    FormatId::TaikoLz81,
    FormatId::Deflate,
    FormatId::Crilayla,
    FormatId::Huffman8,
];

fn asset_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = 0x9E37_79B9u32;
    while data.len() < size {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        match state % 3 {
            0 => data.extend_from_slice(b"\x00\x00\x80\x3F\x00\x00\x00\x00"),
            1 => data.extend(std::iter::repeat_n((state >> 24) as u8, (state >> 12) as usize % 24)),
            _ => data.extend((0..(state >> 20) as usize % 16).map(|i| (state >> (i % 24)) as u8)),
        }
    }
    data.truncate(size);
    data
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    let data = asset_data(32 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for format in FORMATS {
        group.bench_with_input(BenchmarkId::new(format.name(), data.len()), &data, |b, data| {
            b.iter(|| black_box(compress(format, data).unwrap()));
        });
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    let data = asset_data(256 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for format in FORMATS {
        let packed = compress(format, &data).unwrap();
        group.bench_with_input(BenchmarkId::new(format.name(), data.len()), &packed, |b, packed| {
            b.iter(|| black_box(decompress(format, packed, None).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
