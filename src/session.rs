//! Thread-safe split between the UI and the audio engine.
//!
//! # Architecture
//!
//! - **Audio thread** owns the [`Engine`] and calls it once per device buffer
//! - **UI thread** owns the [`Controller`] and feeds it key presses, file
//!   loads and saves
//! - Key state is a shared table of atomic bitsets; everything else moves
//!   through lock-free SPSC rings (`rtrb`), so neither side ever waits
//!
//! ```text
//!            set_manual / set_keyed
//!   UI ───────────────────────────────► ActivationTable ◄──── Engine
//!   UI ──── EngineCommand (Play/Stop) ─────────────────────► Engine
//!   UI ◄─── recorded Event ──────────────────────────────── Engine
//!   UI ◄─── spent playback Timeline ─────────────────────── Engine
//! ```
//!
//! # Usage
//!
//! ```
//! use pianola::{session, SynthConfig};
//!
//! let (mut engine, mut controller) = session(SynthConfig::default());
//!
//! // UI thread
//! controller.set_manual(0, true);
//!
//! // Audio thread
//! let block = engine.synthesize(256);
//! assert_eq!(block.pcm.len(), 512);
//!
//! // UI thread, later
//! assert_eq!(controller.recording().len(), 1);
//! ```

use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::SynthConfig,
    sequencing::{Event, Timeline},
    synth::{
        activation::{ActivationTable, Source},
        engine::{Engine, EngineChannels},
        keys::KeyId,
        message::EngineCommand,
        readback::Readback,
    },
};

/// Build a linked engine/controller pair from a config.
pub fn session(config: SynthConfig) -> (Engine, Controller) {
    let config = config.sanitized();
    let keys = Arc::new(ActivationTable::new(config.voice_count()));
    let readback = Arc::new(Readback::new());

    let (records_tx, records_rx) = RingBuffer::<Event>::new(config.record_capacity);
    let (commands_tx, commands_rx) = RingBuffer::<EngineCommand>::new(config.command_capacity);
    let (retired_tx, retired_rx) = RingBuffer::<Timeline>::new(config.command_capacity);

    let engine = Engine::new(
        &config,
        Arc::clone(&keys),
        EngineChannels {
            records: records_tx,
            commands: commands_rx,
            retired: retired_tx,
        },
        Arc::clone(&readback),
    );

    let controller = Controller {
        keys,
        records: records_rx,
        commands: commands_tx,
        retired: retired_rx,
        readback,
        recording: Timeline::with_capacity(config.record_capacity),
        reported_drops: 0,
        sample_rate: config.sample_rate,
    };

    log::info!(
        "session created: {} voices at {} Hz",
        config.voice_count(),
        config.sample_rate
    );

    (engine, controller)
}

/// The UI-thread half of a session.
pub struct Controller {
    keys: Arc<ActivationTable>,
    records: Consumer<Event>,
    commands: Producer<EngineCommand>,
    retired: Consumer<Timeline>,
    readback: Arc<Readback>,
    /// Performance assembled from the engine's recorded events
    recording: Timeline,
    reported_drops: u64,
    sample_rate: u32,
}

impl Controller {
    /// Pointer/touch press or release. Returns true if the key changed.
    pub fn set_manual(&self, id: KeyId, pressed: bool) -> bool {
        self.keys.set(id, Source::Manual, pressed).unwrap_or(false)
    }

    /// Computer-keyboard press or release by key name (case-insensitive).
    ///
    /// Every key whose name matches is affected. Returns true if any changed.
    pub fn set_keyed(&self, label: char, pressed: bool) -> bool {
        self.keys.set_label(label, pressed)
    }

    /// Release everything the user is holding (e.g. the window lost focus).
    pub fn release_inputs(&self) {
        self.keys.clear_source(Source::Manual);
        self.keys.clear_source(Source::Keyed);
    }

    pub fn is_hot(&self, id: KeyId) -> bool {
        self.keys.is_hot(id)
    }

    pub fn keys(&self) -> &ActivationTable {
        &self.keys
    }

    /// Drain everything the engine has sent back. Call regularly (every UI
    /// frame) so the record ring never fills up.
    ///
    /// Returns the number of events added to the recording.
    pub fn poll(&mut self) -> usize {
        let mut added = 0;
        while let Ok(event) = self.records.pop() {
            if let Err(e) = self.recording.push(event) {
                log::warn!("discarding recorded event: {e}");
                continue;
            }
            added += 1;
        }

        // Spent playback queues are freed here, off the audio thread
        while let Ok(timeline) = self.retired.pop() {
            log::debug!("playback finished ({} events)", timeline.len());
        }

        let dropped = self.readback.dropped_records();
        if dropped > self.reported_drops {
            log::warn!(
                "record ring overflowed: {} events lost",
                dropped - self.reported_drops
            );
            self.reported_drops = dropped;
        }

        added
    }

    /// The performance recorded so far.
    pub fn recording(&mut self) -> &Timeline {
        self.poll();
        &self.recording
    }

    /// Hand over the recording and start a fresh one.
    pub fn take_recording(&mut self) -> Timeline {
        self.poll();
        std::mem::take(&mut self.recording)
    }

    /// Discard the recording, including events still in flight.
    pub fn new_performance(&mut self) {
        self.poll();
        self.recording.clear();
        log::info!("recording cleared");
    }

    /// Queue a timeline for playback. It starts at the next rendered block.
    ///
    /// If the command ring is full the timeline is handed back.
    pub fn load_playback(&mut self, timeline: Timeline) -> Result<(), Timeline> {
        // Single producer: a free slot seen here is still free for the push
        if self.commands.is_full() {
            return Err(timeline);
        }

        let voices = self.keys.len() as KeyId;
        let unknown = timeline.iter().filter(|e| e.key_id >= voices).count();
        if unknown > 0 {
            log::warn!("playback has {unknown} events for keys outside the keyboard");
        }

        let events = timeline.len();
        if self.commands.push(EngineCommand::Play(timeline)).is_ok() {
            log::info!("playback queued ({events} events)");
        }
        Ok(())
    }

    /// Stop playback and release its keys. Returns false if the command ring
    /// was full.
    pub fn stop_playback(&mut self) -> bool {
        self.commands.push(EngineCommand::StopPlayback).is_ok()
    }

    /// Whether the engine was replaying as of its last block
    pub fn is_playing_back(&self) -> bool {
        self.readback.is_playing_back()
    }

    /// Sample clock as of the engine's last block
    pub fn clock(&self) -> u64 {
        self.readback.clock()
    }

    /// Output peak of the last block (0.0 to 1.0)
    pub fn peak(&self) -> f32 {
        self.readback.peak()
    }

    pub fn dropped_records(&self) -> u64 {
        self.readback.dropped_records()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn voice_count(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_press_records_once() {
        let (mut engine, mut controller) = session(SynthConfig::default());

        assert!(controller.set_manual(3, true));
        assert!(!controller.set_manual(3, true));
        engine.synthesize(128);
        engine.synthesize(128);

        assert_eq!(controller.recording().events(), &[Event::new(0, 3, true)]);
    }

    #[test]
    fn overlapping_sources_record_one_edge() {
        let (mut engine, mut controller) = session(SynthConfig::default());

        controller.set_manual(0, true);
        engine.synthesize(64);
        controller.set_keyed('a', true); // also holds key 32
        engine.synthesize(64);
        controller.set_manual(0, false);
        engine.synthesize(64);
        controller.set_keyed('A', false);
        engine.synthesize(64);

        assert_eq!(
            controller.recording().events(),
            &[
                Event::new(0, 0, true),
                Event::new(64, 32, true),
                Event::new(192, 0, false),
                Event::new(192, 32, false),
            ]
        );
    }

    #[test]
    fn new_performance_discards_in_flight_events() {
        let (mut engine, mut controller) = session(SynthConfig::default());
        controller.set_manual(1, true);
        engine.synthesize(64);

        controller.new_performance();
        assert!(controller.recording().is_empty());

        controller.set_manual(1, false);
        engine.synthesize(64);
        assert_eq!(controller.take_recording().len(), 1);
        assert!(controller.recording().is_empty());
    }

    #[test]
    fn unknown_manual_key_is_ignored() {
        let (_engine, controller) = session(SynthConfig::default());
        assert!(!controller.set_manual(500, true));
    }

    #[test]
    fn stop_playback_releases_keys() {
        let (mut engine, mut controller) = session(SynthConfig::default());
        let timeline = Timeline::from_events(vec![
            Event::new(0, 2, true),
            Event::new(480_000, 2, false),
        ])
        .unwrap();

        controller.load_playback(timeline).unwrap();
        engine.synthesize(128);
        assert!(controller.is_hot(2));
        assert!(controller.is_playing_back());

        assert!(controller.stop_playback());
        engine.synthesize(128);
        assert!(!controller.is_hot(2));
        assert!(!controller.is_playing_back());
    }

    #[test]
    fn full_record_ring_is_reported() {
        let config = SynthConfig::default().record_capacity(2);
        let (mut engine, mut controller) = session(config);

        for id in 0..5 {
            controller.set_manual(id, true);
        }
        engine.synthesize(32);

        assert_eq!(controller.recording().len(), 2);
        assert_eq!(controller.dropped_records(), 3);
    }

    #[test]
    fn refused_presses_arrive_once_the_ring_drains() {
        let config = SynthConfig::default().record_capacity(2);
        let (mut engine, mut controller) = session(config);

        for id in 0..5 {
            controller.set_manual(id, true);
        }
        engine.synthesize(32);
        controller.poll();
        engine.synthesize(32);
        controller.poll();
        engine.synthesize(32);

        let recording = controller.take_recording();
        let ids: Vec<KeyId> = recording.iter().map(|e| e.key_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(recording.iter().all(|e| e.pressed));
        assert_eq!(recording.get(4).map(|e| e.sample_time), Some(64));
    }

    #[test]
    fn full_command_ring_hands_timeline_back() {
        let config = SynthConfig::default().command_capacity(1);
        let (mut engine, mut controller) = session(config);
        let timeline = Timeline::from_events(vec![Event::new(0, 0, true)]).unwrap();

        controller.load_playback(timeline.clone()).unwrap();
        let returned = controller.load_playback(timeline.clone()).unwrap_err();
        assert_eq!(returned.len(), 1);

        engine.synthesize(32);
        assert!(controller.load_playback(timeline).is_ok());
    }
}
