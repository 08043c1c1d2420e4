//! Benchmarks for bit streams and decode history.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kompression_core::{BitReader, BitWriter, History, MsbBitReader, MsbBitWriter};
use std::hint::black_box;
use std::io::Cursor;

fn bench_bitstreams(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitstream");

    for &count in &[1024usize, 65536] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("lsb_roundtrip", count), &count, |b, &n| {
            b.iter(|| {
                let mut writer = BitWriter::new(Vec::new());
                for i in 0..n {
                    writer.write_bits(i as u32, (i % 13 + 1) as u8).unwrap();
                }
                let data = writer.into_inner().unwrap();
                let mut reader = BitReader::new(Cursor::new(&data));
                for i in 0..n {
                    black_box(reader.read_bits((i % 13 + 1) as u8).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("msb_roundtrip", count), &count, |b, &n| {
            b.iter(|| {
                let mut writer = MsbBitWriter::new();
                for i in 0..n {
                    writer.write_bits(i as u32, (i % 13 + 1) as u8);
                }
                let data = writer.into_vec();
                let mut reader = MsbBitReader::new(&data);
                for i in 0..n {
                    black_box(reader.read_bits((i % 13 + 1) as u8).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");
    group.throughput(Throughput::Bytes(1 << 20));

    group.bench_function("overlapping_copies", |b| {
        b.iter(|| {
            let mut history = History::new();
            history.extend_from_slice(b"abc").unwrap();
            while history.len() < 1 << 20 {
                history.copy_match(3, 18).unwrap();
            }
            black_box(history.len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_bitstreams, bench_history);
criterion_main!(benches);
