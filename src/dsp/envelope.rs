use crate::config::Tuning;

/*
Gate Envelope and Pluck Intensity
=================================

Each voice is shaped by two independent multipliers:

    output = sin(...) × level × intensity

Vocabulary
----------

  gate        Whether the key is currently held (by any source). There is no
              note_on/note_off event here: the envelope just looks at the gate
              every sample and moves toward where it should be.

  level       The envelope value, 0.0 to 1.0. Rises while the gate is high,
              falls while it is low.

  intensity   A second multiplier, 0.0 to 1.0, that ONLY ever falls. It is
              what turns a sustained sine into something plucked: even a held
              key slowly fades out.

  restrike    The moment `level` leaves exactly 0.0. Intensity snaps back to
              1.0 and the oscillator restarts at phase 0.


The Shape
---------

    Level
      1.0 ┐     ___________
          │    ╱           ╲
          │   ╱             ╲
      0.0 └──╱───────────────╲────→ Time
            gate high      gate low
            (+attack)      (-decay)

    Intensity
      1.0 ┐─╲
          │   ╲
          │     ╲_
      0.0 └───────╲______________→ Time
            restrike

Both the rise and the fall are linear with a fixed per-sample rate, so the
fade time does not depend on the sample rate's meaning of "seconds": 1/0.003
≈ 333 samples, about 7 ms at 48 kHz.


Restrike Rule
-------------

Only a rise from EXACTLY zero restrikes. If the key is pressed again while the
level is still falling, the level turns around and climbs back from wherever
it was, keeping the same phase and the same (already faded) intensity:

    Idle ──gate──→ Rising ──release──→ Decaying ──level=0──→ Idle
                     ↑                    │
                     └──────gate──────────┘   (no restrike)

Clamping is the only "error handling" in here: level and intensity are pinned
to [0, 1] every sample so nothing downstream needs to check them.
*/

/// Derived stage of a voice's envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,     // level = 0, gate low
    Rising,   // gate high
    Decaying, // gate low, level > 0
}

/// Linear gate-following envelope.
#[derive(Debug, Clone, Default)]
pub struct GateEnvelope {
    level: f64,
}

impl GateEnvelope {
    pub fn new() -> Self {
        Self { level: 0.0 }
    }

    /// Advance by one sample. Returns true when this step restruck the voice.
    #[inline]
    pub fn next_sample(&mut self, gate: bool, tuning: &Tuning) -> bool {
        let step = if gate {
            tuning.attack_rate
        } else {
            -tuning.decay_rate
        };
        let next = (self.level + step).clamp(0.0, 1.0);
        let restrike = self.level == 0.0 && next > 0.0;
        self.level = next;
        restrike
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// True while there is still something to hear or the gate is high.
    pub fn is_active(&self, gate: bool) -> bool {
        gate || self.level > 0.0
    }

    pub fn stage(&self, gate: bool) -> EnvelopeStage {
        match (gate, self.level > 0.0) {
            (true, _) => EnvelopeStage::Rising,
            (false, true) => EnvelopeStage::Decaying,
            (false, false) => EnvelopeStage::Idle,
        }
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}

/// Monotonically falling pluck multiplier.
#[derive(Debug, Clone)]
pub struct Intensity {
    value: f64,
}

impl Intensity {
    pub fn new() -> Self {
        Self { value: 1.0 }
    }

    pub fn restrike(&mut self) {
        self.value = 1.0;
    }

    /// Current value, then decay by one step (floored at zero).
    #[inline]
    pub fn next_sample(&mut self, step: f64) -> f64 {
        let value = self.value;
        self.value = (self.value - step).max(0.0);
        value
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(env: &mut GateEnvelope, gate: bool, samples: usize, tuning: &Tuning) -> usize {
        let mut restrikes = 0;
        for _ in 0..samples {
            if env.next_sample(gate, tuning) {
                restrikes += 1;
            }
        }
        restrikes
    }

    #[test]
    fn attack_reaches_full_level_in_about_333_samples() {
        let tuning = Tuning::default();
        let mut env = GateEnvelope::new();

        run(&mut env, true, 332, &tuning);
        assert!(env.level() < 1.0);

        run(&mut env, true, 2, &tuning);
        assert_eq!(env.level(), 1.0);
    }

    #[test]
    fn decay_returns_to_idle() {
        let tuning = Tuning::default();
        let mut env = GateEnvelope::new();

        run(&mut env, true, 500, &tuning);
        assert_eq!(env.stage(false), EnvelopeStage::Decaying);

        run(&mut env, false, 334, &tuning);
        assert_eq!(env.level(), 0.0);
        assert_eq!(env.stage(false), EnvelopeStage::Idle);
        assert!(!env.is_active(false));
    }

    #[test]
    fn only_rise_from_zero_restrikes() {
        let tuning = Tuning::default();
        let mut env = GateEnvelope::new();

        assert_eq!(run(&mut env, true, 100, &tuning), 1);
        // Release part way, press again before silence
        run(&mut env, false, 50, &tuning);
        assert!(env.level() > 0.0);
        assert_eq!(run(&mut env, true, 100, &tuning), 0);
    }

    #[test]
    fn intensity_floors_at_zero() {
        let mut intensity = Intensity::new();
        assert_eq!(intensity.next_sample(0.4), 1.0);
        intensity.next_sample(0.4);
        intensity.next_sample(0.4);
        assert_eq!(intensity.value(), 0.0);

        intensity.restrike();
        assert_eq!(intensity.value(), 1.0);
    }
}
