pub mod event;
pub mod player;
pub mod recorder;

pub use event::{Event, Timeline, TimelineError};
pub use player::{EventPlayer, PlaybackStep};
pub use recorder::{EventRecorder, EventSink};
