use rtrb::Consumer;

use crate::sequencing::Timeline;

/// Requests from the UI thread, applied at the start of the next block.
#[derive(Debug)]
pub enum EngineCommand {
    /// Start replaying a timeline, replacing any playback in progress
    Play(Timeline),
    /// Abandon playback and release every key it holds
    StopPlayback,
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<EngineCommand>;
}

impl CommandReceiver for Consumer<EngineCommand> {
    fn pop(&mut self) -> Option<EngineCommand> {
        Consumer::pop(self).ok()
    }
}
