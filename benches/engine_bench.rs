//! Benchmarks for the voice primitives and the full render path.
//!
//! Run with: cargo bench
//!
//! The engine renders on the audio thread, so every block must finish well
//! inside the device deadline.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Per-sample primitives (oscillator, envelope, PCM conversion)
//!   - scenarios/*  Whole engine blocks: chords, full keyboard, replay

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Per-sample primitives
    dsp::bench_oscillator,
    dsp::bench_envelope,
    dsp::bench_pcm,
    // Engine scenarios
    scenarios::bench_chords,
    scenarios::bench_playback,
);
criterion_main!(benches);
