//! Benchmarks for rendering held keys.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pianola::{session, SynthConfig};

use crate::BLOCK_SIZES;

pub fn bench_chords(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chords");

    for &size in BLOCK_SIZES {
        let mut out = vec![0i16; size];

        // === IDLE ===
        // Nothing held: voices are skipped, only the mix is cleared
        let (mut engine, _controller) = session(SynthConfig::default());
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| engine.process(black_box(&mut out)))
        });

        // === TRIAD ===
        // A typical chord: three voices rendering
        let (mut engine, controller) = session(SynthConfig::default());
        for id in [12, 16, 19] {
            controller.set_manual(id, true);
        }
        group.bench_with_input(BenchmarkId::new("triad", size), &size, |b, _| {
            b.iter(|| engine.process(black_box(&mut out)))
        });

        // === FULL KEYBOARD ===
        // Worst case: every voice hot and the output clipping
        let (mut engine, controller) = session(SynthConfig::default());
        for id in 0..controller.voice_count() as u32 {
            controller.set_manual(id, true);
        }
        group.bench_with_input(BenchmarkId::new("all_keys", size), &size, |b, _| {
            b.iter(|| engine.process(black_box(&mut out)))
        });

        // === BYTES OUT ===
        // Same triad through the byte-buffer entry point
        let (mut engine, controller) = session(SynthConfig::default());
        for id in [12, 16, 19] {
            controller.set_manual(id, true);
        }
        group.bench_with_input(BenchmarkId::new("triad_bytes", size), &size, |b, &size| {
            b.iter(|| {
                black_box(engine.synthesize(size).pcm.len());
            })
        });
    }

    group.finish();
}
