//! Player - replays a recorded timeline against the running sample clock
//!
//! The player runs in the audio thread and converts timeline-relative event
//! times into playback activations. Times in a loaded timeline are relative;
//! the first block that sees a non-empty queue pins them to the clock:
//!
//!   absolute time = alignment offset + event.sample_time
//!
//! Events are delivered at block granularity: every event that falls before
//! the end of the current block is applied before the block is rendered.

use crate::synth::activation::{ActivationTable, Source};

use super::event::Timeline;

/// What happened during one call to [`EventPlayer::advance`].
#[derive(Debug, Default)]
pub struct PlaybackStep {
    /// Events consumed this block (including ones for unknown keys)
    pub delivered: usize,
    /// The queue, once fully consumed, for disposal off the audio thread
    pub finished: Option<Timeline>,
}

/// Forward-only consumer of one playback queue at a time.
#[derive(Debug, Default)]
pub struct EventPlayer {
    queue: Option<Timeline>,
    /// Index of the next event to deliver
    cursor: usize,
    /// Clock value that timeline time zero maps to
    offset: Option<u64>,
}

impl EventPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current queue. Alignment restarts from the next block.
    ///
    /// Returns the queue that was playing, if any.
    pub fn load(&mut self, timeline: Timeline) -> Option<Timeline> {
        self.cursor = 0;
        self.offset = None;
        self.queue.replace(timeline)
    }

    /// Abandon the current queue and release every key it was holding.
    pub fn stop(&mut self, keys: &ActivationTable) -> Option<Timeline> {
        self.cursor = 0;
        self.offset = None;
        keys.clear_source(Source::Playback);
        self.queue.take()
    }

    /// Deliver every event due before `clock + frames`.
    pub fn advance(&mut self, clock: u64, frames: usize, keys: &ActivationTable) -> PlaybackStep {
        let mut step = PlaybackStep::default();

        let Some(queue) = self.queue.as_ref() else {
            self.offset = None;
            return step;
        };

        if self.cursor < queue.len() {
            let offset = *self.offset.get_or_insert(clock);
            let horizon = clock - offset + frames as u64;

            while let Some(event) = queue.get(self.cursor) {
                if event.sample_time >= horizon {
                    break;
                }
                // Unknown keys are skipped; the rest of the queue still plays
                let _ = keys.set(event.key_id, Source::Playback, event.pressed);
                self.cursor += 1;
                step.delivered += 1;
            }
        }

        if self.cursor >= queue.len() {
            self.cursor = 0;
            self.offset = None;
            step.finished = self.queue.take();
        }

        step
    }

    pub fn is_playing(&self) -> bool {
        self.queue.is_some()
    }

    /// Events still waiting to be delivered
    pub fn remaining(&self) -> usize {
        self.queue
            .as_ref()
            .map(|q| q.len() - self.cursor)
            .unwrap_or(0)
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }
}
