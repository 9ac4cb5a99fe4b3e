//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the per-sample
//! math; the `synth` layer decides which voices run and when.

/// Gate-following envelope and pluck intensity.
pub mod envelope;
/// Sine oscillator with an integer phase accumulator.
pub mod oscillator;
/// Mix to PCM16 conversion with hard clipping.
pub mod pcm;

pub use envelope::{EnvelopeStage, GateEnvelope, Intensity};
pub use oscillator::SineOscillator;
