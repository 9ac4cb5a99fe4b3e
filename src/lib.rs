pub mod config; // Tuning and session configuration
pub mod dsp;
pub mod io; // Performance files and offline rendering
pub mod sequencing; // Event recording and playback
pub mod session;
pub mod synth; // Voices, activation and the render engine

pub use config::{SynthConfig, Tuning};
pub use sequencing::{Event, Timeline};
pub use session::{session, Controller};
pub use synth::engine::{Engine, RenderedBlock};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
