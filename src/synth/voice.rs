use crate::{
    config::Tuning,
    dsp::{EnvelopeStage, GateEnvelope, Intensity, SineOscillator},
};

use super::keys::{is_black, key_frequency, key_name, KeyId};

/// One playable key: a sine oscillator shaped by a gate envelope and a
/// falling pluck intensity.
///
/// Voices never allocate and never go away; the engine owns one per key for
/// its whole lifetime and skips the ones that are idle.
#[derive(Debug, Clone)]
pub struct Voice {
    id: KeyId,
    frequency: f64,
    osc: SineOscillator,
    envelope: GateEnvelope,
    intensity: Intensity,
    previous_hot: bool,
}

impl Voice {
    pub fn new(id: KeyId, sample_rate: u32) -> Self {
        let frequency = key_frequency(id);
        Self {
            id,
            frequency,
            osc: SineOscillator::new(frequency, sample_rate),
            envelope: GateEnvelope::new(),
            intensity: Intensity::new(),
            previous_hot: false,
        }
    }

    /// Advance by one sample and return this voice's contribution.
    #[inline]
    pub fn next_sample(&mut self, hot: bool, tuning: &Tuning) -> f64 {
        if self.envelope.next_sample(hot, tuning) {
            self.osc.reset();
            self.intensity.restrike();
        }
        let amplitude = self.envelope.level();
        let intensity = self.intensity.next_sample(tuning.intensity_step);
        self.osc.next_sample() * amplitude * intensity
    }

    /// Add `mix.len()` samples of this voice into the accumulator.
    pub fn render_into(&mut self, hot: bool, tuning: &Tuning, mix: &mut [f64]) {
        for sample in mix.iter_mut() {
            *sample += self.next_sample(hot, tuning);
        }
    }

    /// Idle, silent voices can be skipped without changing the output.
    #[inline]
    pub fn needs_processing(&self, hot: bool) -> bool {
        self.envelope.is_active(hot)
    }

    /// Compare against the last observed state; `Some(hot)` on an edge.
    pub fn take_transition(&mut self, hot: bool) -> Option<bool> {
        if hot == self.previous_hot {
            return None;
        }
        self.previous_hot = hot;
        Some(hot)
    }

    /// Undo [`take_transition`](Self::take_transition) so the same edge is
    /// reported again next block.
    pub fn defer_transition(&mut self, pressed: bool) {
        self.previous_hot = !pressed;
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn name(&self) -> char {
        key_name(self.id)
    }

    pub fn is_black(&self) -> bool {
        is_black(self.id)
    }

    pub fn amplitude(&self) -> f64 {
        self.envelope.level()
    }

    pub fn intensity(&self) -> f64 {
        self.intensity.value()
    }

    pub fn phase(&self) -> u64 {
        self.osc.phase()
    }

    pub fn previous_hot(&self) -> bool {
        self.previous_hot
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.envelope.stage(self.previous_hot)
    }
}
