/// Monotonic count of samples rendered this session.
///
/// Advances only by the exact number of frames each block produced; it is
/// never reset, so event times recorded against it stay comparable for the
/// whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleClock {
    now: u64,
}

impl SampleClock {
    pub fn new() -> Self {
        Self { now: 0 }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance by one block, returning the time the block started at.
    pub fn advance(&mut self, frames: usize) -> u64 {
        let start = self.now;
        self.now += frames as u64;
        start
    }

    /// Seconds elapsed at the given sample rate
    pub fn seconds(&self, sample_rate: u32) -> f64 {
        self.now as f64 / sample_rate as f64
    }
}
