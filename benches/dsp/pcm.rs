//! Benchmarks for mix to PCM16 conversion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pianola::dsp::pcm::{write_le_bytes, write_pcm16};

use crate::BLOCK_SIZES;

pub fn bench_pcm(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/pcm");

    for &size in BLOCK_SIZES {
        // A mix that clips about half the time
        let mix: Vec<f64> = (0..size).map(|i| ((i as f64) * 0.05).sin() * 12.0).collect();
        let mut samples = vec![0i16; size];
        let mut bytes = vec![0u8; size * 2];

        group.bench_with_input(BenchmarkId::new("to_pcm16", size), &size, |b, _| {
            b.iter(|| {
                write_pcm16(black_box(&mix), 5000.0, black_box(&mut samples));
            })
        });

        group.bench_with_input(BenchmarkId::new("le_bytes", size), &size, |b, _| {
            b.iter(|| {
                write_le_bytes(black_box(&samples), black_box(&mut bytes));
            })
        });
    }

    group.finish();
}
