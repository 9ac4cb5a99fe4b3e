//! Benchmarks for per-sample primitives.

mod envelope;
mod oscillator;
mod pcm;

pub use envelope::bench_envelope;
pub use oscillator::bench_oscillator;
pub use pcm::bench_pcm;
