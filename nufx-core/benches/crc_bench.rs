//! CRC-16 throughput across data sizes and patterns.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nufx_core::crc::Crc16;
use std::hint::black_box;

fn pseudo_random(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x123456789ABCDEF0;
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn bench_crc16(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc16");

    // 4096 is the LZW/1 chunk size; 143360 is a 5.25" disk image.
    for size in [64usize, 4096, 143_360] {
        let data = pseudo_random(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("compute", size), &data, |b, data| {
            b.iter(|| Crc16::compute(black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("bytewise", size), &data, |b, data| {
            b.iter(|| {
                let mut crc = Crc16::new();
                for &byte in black_box(data) {
                    crc.update_byte(byte);
                }
                crc.finalize()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_crc16);
criterion_main!(benches);
