//! Whole-engine benchmarks.
//!
//! These model actual use: a few held keys, everything held at once, and a
//! recorded performance being replayed.

mod chords;
mod playback;

pub use chords::bench_chords;
pub use playback::bench_playback;
