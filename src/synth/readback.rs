use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Lock-free engine → UI readback.
///
/// Written once per block by the audio thread, read whenever the UI likes.
#[derive(Debug, Default)]
pub struct Readback {
    clock: AtomicU64,
    dropped_records: AtomicU64,
    playing_back: AtomicBool,
    /// Largest |sample| in the last block
    peak: AtomicU32,
}

impl Readback {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn publish(&self, clock: u64, dropped_records: u64, playing_back: bool, peak: u16) {
        self.clock.store(clock, Ordering::Relaxed);
        self.dropped_records.store(dropped_records, Ordering::Relaxed);
        self.playing_back.store(playing_back, Ordering::Relaxed);
        self.peak.store(peak as u32, Ordering::Relaxed);
    }

    /// Sample clock after the last rendered block
    pub fn clock(&self) -> u64 {
        self.clock.load(Ordering::Relaxed)
    }

    pub fn dropped_records(&self) -> u64 {
        self.dropped_records.load(Ordering::Relaxed)
    }

    pub fn is_playing_back(&self) -> bool {
        self.playing_back.load(Ordering::Relaxed)
    }

    /// Peak of the last block as a fraction of full scale
    pub fn peak(&self) -> f32 {
        self.peak.load(Ordering::Relaxed) as f32 / 32768.0
    }
}
