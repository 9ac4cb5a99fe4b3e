//! Session configuration and voice tuning constants.
//!
//! Every value has a default matching the stock instrument, so an empty TOML
//! file (or none at all) yields a playable three-octave keyboard at 48 kHz.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::{fs, path::Path};

use crate::{DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE};

/// Keys per octave; voice ids are `octave * 12 + note`.
pub const KEYS_PER_OCTAVE: usize = 12;
/// Upper bound on the configured keyboard size.
pub const MAX_OCTAVES: usize = 8;

/// Per-sample envelope and output constants.
///
/// These encode the "feel" of the instrument rather than any acoustic model:
/// a linear ~7 ms fade in and out, a slow intensity decay that makes every
/// note behave like a plucked string, and a fixed output gain into PCM16.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Amplitude gained per sample while a key is hot.
    pub attack_rate: f64,
    /// Amplitude lost per sample once a key is released.
    pub decay_rate: f64,
    /// Intensity lost per sample, independent of key state.
    pub intensity_step: f64,
    /// Linear gain from the summed mix to PCM16 before clipping.
    pub output_gain: f64,
}

impl Tuning {
    pub const DEFAULT_ATTACK_RATE: f64 = 0.003;
    pub const DEFAULT_DECAY_RATE: f64 = 0.003;
    pub const DEFAULT_INTENSITY_STEP: f64 = 6e-5;
    pub const DEFAULT_OUTPUT_GAIN: f64 = 5000.0;

    /// Set the attack rate (amplitude per sample)
    pub fn attack_rate(mut self, rate: f64) -> Self {
        self.attack_rate = rate;
        self
    }

    /// Set the decay rate (amplitude per sample)
    pub fn decay_rate(mut self, rate: f64) -> Self {
        self.decay_rate = rate;
        self
    }

    /// Set the per-sample intensity decrement
    pub fn intensity_step(mut self, step: f64) -> Self {
        self.intensity_step = step;
        self
    }

    /// Set the output gain applied before PCM16 clipping
    pub fn output_gain(mut self, gain: f64) -> Self {
        self.output_gain = gain;
        self
    }

    /// Clamp every rate into [0, 1] and reject non-finite values.
    pub fn sanitized(self) -> Self {
        let rate = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };

        let output_gain = if self.output_gain.is_finite() && self.output_gain >= 0.0 {
            self.output_gain
        } else {
            Self::DEFAULT_OUTPUT_GAIN
        };

        Self {
            attack_rate: rate(self.attack_rate, Self::DEFAULT_ATTACK_RATE),
            decay_rate: rate(self.decay_rate, Self::DEFAULT_DECAY_RATE),
            intensity_step: rate(self.intensity_step, Self::DEFAULT_INTENSITY_STEP),
            output_gain,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            attack_rate: Self::DEFAULT_ATTACK_RATE,
            decay_rate: Self::DEFAULT_DECAY_RATE,
            intensity_step: Self::DEFAULT_INTENSITY_STEP,
            output_gain: Self::DEFAULT_OUTPUT_GAIN,
        }
    }
}

/// Everything needed to build a [`crate::session`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Number of octaves on the keyboard (12 voices each)
    pub octaves: usize,
    /// Frames the engine pre-allocates scratch space for
    pub max_block_size: usize,
    /// Capacity of the audio → UI ring carrying recorded events
    pub record_capacity: usize,
    /// Capacity of the UI → audio command ring
    pub command_capacity: usize,
    pub tuning: Tuning,
}

impl SynthConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output sample rate
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the number of octaves
    pub fn octaves(mut self, octaves: usize) -> Self {
        self.octaves = octaves;
        self
    }

    /// Set the pre-allocated block size
    pub fn max_block_size(mut self, frames: usize) -> Self {
        self.max_block_size = frames;
        self
    }

    /// Set the recorded-event ring capacity
    pub fn record_capacity(mut self, capacity: usize) -> Self {
        self.record_capacity = capacity;
        self
    }

    /// Set the playback command ring capacity
    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity;
        self
    }

    /// Replace the tuning constants
    pub fn tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Total number of voices
    pub fn voice_count(&self) -> usize {
        self.octaves * KEYS_PER_OCTAVE
    }

    /// Clamp out-of-range values so the engine can always be built.
    pub fn sanitized(self) -> Self {
        Self {
            sample_rate: self.sample_rate.max(1),
            octaves: self.octaves.clamp(1, MAX_OCTAVES),
            max_block_size: self.max_block_size.max(1),
            record_capacity: self.record_capacity.max(1),
            command_capacity: self.command_capacity.max(1),
            tuning: self.tuning.sanitized(),
        }
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            octaves: 3,
            max_block_size: MAX_BLOCK_SIZE,
            record_capacity: 4096,
            command_capacity: 16,
            tuning: Tuning::default(),
        }
    }
}

#[cfg(feature = "serde")]
impl SynthConfig {
    /// Read a TOML config, or write the defaults there if the file is missing.
    ///
    /// A file that exists but cannot be parsed falls back to the defaults and
    /// is left untouched.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<SynthConfig>(&contents) {
                    Ok(cfg) => return cfg.sanitized(),
                    Err(e) => {
                        log::warn!("failed to parse {}: {e}; using defaults", path.display());
                    }
                },
                Err(e) => {
                    log::warn!("failed to read {}: {e}; using defaults", path.display());
                }
            }
            return Self::default();
        }

        let defaults = Self::default();
        if let Err(e) = defaults.save(path) {
            log::warn!("failed to write default config to {}: {e}", path.display());
        }
        defaults
    }

    /// Write this config as pretty TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let text = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, text)
    }
}
