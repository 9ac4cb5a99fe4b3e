//! Sample-indexed sine oscillator.

/*
Sample-Indexed Phase
====================

Most oscillators keep a phase in radians (or in [0, 1)) and add a small
increment every sample, wrapping when they pass a full cycle. Every addition
rounds a little, and after millions of samples the pitch drifts.

This oscillator keeps an INTEGER sample counter instead and recomputes the
angle from scratch every sample:

    angle  = phase × increment
    sample = sin(angle)

    where increment = 2π × frequency / sample_rate

Nothing accumulates except an exact integer, so there is no drift. The price
is that `phase × increment` loses precision once `phase` gets very large
(around 2^40 samples, roughly 260 days at 48 kHz), far beyond a session.

The counter is reset to zero whenever a voice starts from silence, so every
fresh note begins at the zero crossing and never clicks on its first sample.
*/

use std::f64::consts::TAU;

/// Sine oscillator with an integer phase accumulator.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    increment: f64, // radians per sample
    phase: u64,     // samples since last reset
}

impl SineOscillator {
    pub fn new(frequency: f64, sample_rate: u32) -> Self {
        Self {
            increment: TAU * frequency / sample_rate as f64,
            phase: 0,
        }
    }

    /// Restart from the zero crossing.
    pub fn reset(&mut self) {
        self.phase = 0;
    }

    /// Current sample value, then advance the phase by one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        let value = (self.phase as f64 * self.increment).sin();
        self.phase = self.phase.wrapping_add(1);
        value
    }

    /// Samples elapsed since the last reset
    pub fn phase(&self) -> u64 {
        self.phase
    }

    /// Radians advanced per sample
    pub fn increment(&self) -> f64 {
        self.increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_crossing() {
        let mut osc = SineOscillator::new(440.0, 48_000);
        assert_eq!(osc.next_sample(), 0.0);
        assert_eq!(osc.phase(), 1);
    }

    #[test]
    fn quarter_period_reaches_peak() {
        // 1 kHz at 4 kHz: one cycle every 4 samples
        let mut osc = SineOscillator::new(1_000.0, 4_000);
        osc.next_sample();
        let peak = osc.next_sample();
        assert!((peak - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reset_restarts_phase() {
        let mut osc = SineOscillator::new(220.0, 48_000);
        for _ in 0..100 {
            osc.next_sample();
        }
        osc.reset();
        assert_eq!(osc.phase(), 0);
        assert_eq!(osc.next_sample(), 0.0);
    }

    #[test]
    fn long_runs_stay_periodic() {
        // Exactly 12 samples per cycle; after a million cycles we are back at zero
        let mut osc = SineOscillator {
            increment: TAU / 12.0,
            phase: 12 * 1_000_000,
        };
        assert!(osc.next_sample().abs() < 1e-6);
    }
}
