//! Recorder - turns key state edges into timestamped events
//!
//! Runs on the audio thread after each block is synthesized. Every voice
//! whose effective state differs from what was observed last block produces
//! exactly one event, stamped with the clock at the START of the block.

use rtrb::Producer;

use super::event::{Event, Timeline};
use crate::synth::voice::Voice;

/// Destination for recorded events.
pub trait EventSink {
    /// Store one event. Returns false if it had to be dropped.
    fn push_event(&mut self, event: Event) -> bool;
}

impl EventSink for Producer<Event> {
    fn push_event(&mut self, event: Event) -> bool {
        self.push(event).is_ok()
    }
}

impl EventSink for Timeline {
    fn push_event(&mut self, event: Event) -> bool {
        self.push(event).is_ok()
    }
}

/// Edge detector feeding an [`EventSink`].
pub struct EventRecorder<S: EventSink> {
    sink: S,
    dropped: u64,
}

impl<S: EventSink> EventRecorder<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, dropped: 0 }
    }

    /// Record every transition between `previous_hot` and `hot` for this block.
    ///
    /// `hot[i]` is the state voice `i` was rendered with. An edge the sink
    /// refuses stays pending and is offered again next block, stamped with
    /// that block's start. Returns the number of edges seen (including any
    /// the sink refused).
    pub fn observe(&mut self, block_start: u64, voices: &mut [Voice], hot: &[bool]) -> usize {
        let mut emitted = 0;
        for (voice, &hot) in voices.iter_mut().zip(hot) {
            if let Some(pressed) = voice.take_transition(hot) {
                let event = Event::new(block_start, voice.id(), pressed);
                if !self.sink.push_event(event) {
                    voice.defer_transition(pressed);
                    self.dropped += 1;
                }
                emitted += 1;
            }
        }
        emitted
    }

    /// Pushes the sink refused, counting each retry
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices(n: u32) -> Vec<Voice> {
        (0..n).map(|id| Voice::new(id, 48_000)).collect()
    }

    #[test]
    fn steady_state_records_nothing() {
        let mut voices = voices(4);
        let mut recorder = EventRecorder::new(Timeline::new());

        assert_eq!(recorder.observe(0, &mut voices, &[false; 4]), 0);
        assert_eq!(recorder.observe(256, &mut voices, &[false; 4]), 0);
        assert!(recorder.sink().is_empty());
    }

    #[test]
    fn one_event_per_edge_at_block_start() {
        let mut voices = voices(4);
        let mut recorder = EventRecorder::new(Timeline::new());

        recorder.observe(0, &mut voices, &[false, true, false, false]);
        recorder.observe(256, &mut voices, &[false, true, false, false]);
        recorder.observe(512, &mut voices, &[true, false, false, false]);

        assert_eq!(
            recorder.sink().events(),
            &[
                Event::new(0, 1, true),
                Event::new(512, 0, true),
                Event::new(512, 1, false),
            ]
        );
    }

    #[test]
    fn full_ring_counts_drops() {
        let (producer, mut consumer) = rtrb::RingBuffer::<Event>::new(1);
        let mut voices = voices(3);
        let mut recorder = EventRecorder::new(producer);

        recorder.observe(0, &mut voices, &[true, true, true]);

        assert_eq!(recorder.dropped(), 2);
        assert_eq!(consumer.pop(), Ok(Event::new(0, 0, true)));
        assert!(consumer.pop().is_err());
    }

    #[test]
    fn refused_edge_is_retried_next_block() {
        let (producer, mut consumer) = rtrb::RingBuffer::<Event>::new(1);
        let mut voices = voices(2);
        let mut recorder = EventRecorder::new(producer);

        recorder.observe(0, &mut voices, &[true, false]);
        // Ring still holds the first press
        recorder.observe(256, &mut voices, &[false, false]);
        assert_eq!(recorder.dropped(), 1);
        assert!(voices[0].previous_hot());

        assert_eq!(consumer.pop(), Ok(Event::new(0, 0, true)));
        recorder.observe(512, &mut voices, &[false, false]);
        assert_eq!(consumer.pop(), Ok(Event::new(512, 0, false)));
        assert!(!voices[0].previous_hot());

        // Nothing left pending
        assert_eq!(recorder.observe(768, &mut voices, &[false, false]), 0);
        assert_eq!(recorder.dropped(), 1);
    }
}
