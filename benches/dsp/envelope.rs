//! Benchmarks for the gate envelope and intensity decay.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pianola::{
    dsp::{GateEnvelope, Intensity},
    Tuning,
};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let tuning = Tuning::default();

    for &size in BLOCK_SIZES {
        // Gate toggles every block so both ramps are exercised
        let mut envelope = GateEnvelope::new();
        let mut gate = false;
        group.bench_with_input(BenchmarkId::new("gate", size), &size, |b, &size| {
            b.iter(|| {
                gate = !gate;
                for _ in 0..size {
                    black_box(envelope.next_sample(black_box(gate), &tuning));
                }
            })
        });

        let mut intensity = Intensity::new();
        group.bench_with_input(BenchmarkId::new("intensity", size), &size, |b, &size| {
            b.iter(|| {
                intensity.restrike();
                for _ in 0..size {
                    black_box(intensity.next_sample(tuning.intensity_step));
                }
            })
        });
    }

    group.finish();
}
