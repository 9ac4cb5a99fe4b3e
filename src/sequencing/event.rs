use crate::synth::keys::KeyId;

/// A key state change at an absolute sample position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Samples since the start of the timeline (or of the session clock)
    pub sample_time: u64,
    pub key_id: KeyId,
    /// true = key went hot, false = key went cold
    pub pressed: bool,
}

impl Event {
    pub fn new(sample_time: u64, key_id: KeyId, pressed: bool) -> Self {
        Self {
            sample_time,
            key_id,
            pressed,
        }
    }
}

/// Events ordered by non-decreasing `sample_time`.
///
/// The same type serves as the recording being captured and as the queue
/// handed to the player; the ordering invariant is enforced on every
/// insertion so the player never has to sort on the audio thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    events: Vec<Event>,
}

impl Timeline {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Build from events that are already in time order.
    pub fn from_events(events: Vec<Event>) -> Result<Self, TimelineError> {
        if let Some(index) = events
            .windows(2)
            .position(|pair| pair[1].sample_time < pair[0].sample_time)
        {
            return Err(TimelineError::OutOfOrder {
                index: index + 1,
                previous: events[index].sample_time,
                actual: events[index + 1].sample_time,
            });
        }
        Ok(Self { events })
    }

    /// Append an event no earlier than the last one.
    pub fn push(&mut self, event: Event) -> Result<(), TimelineError> {
        if let Some(last) = self.events.last() {
            if event.sample_time < last.sample_time {
                return Err(TimelineError::OutOfOrder {
                    index: self.events.len(),
                    previous: last.sample_time,
                    actual: event.sample_time,
                });
            }
        }
        self.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn start_time(&self) -> Option<u64> {
        self.events.first().map(|e| e.sample_time)
    }

    pub fn end_time(&self) -> Option<u64> {
        self.events.last().map(|e| e.sample_time)
    }

    /// Copy with every time shifted so the first event sits at zero.
    pub fn normalized(&self) -> Timeline {
        let start = self.start_time().unwrap_or(0);
        Timeline {
            events: self
                .events
                .iter()
                .map(|e| Event::new(e.sample_time - start, e.key_id, e.pressed))
                .collect(),
        }
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Errors that can occur when building a timeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// An event is earlier than the one before it
    OutOfOrder {
        index: usize,
        previous: u64,
        actual: u64,
    },
}

impl std::fmt::Display for TimelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimelineError::OutOfOrder {
                index,
                previous,
                actual,
            } => write!(
                f,
                "Event {} at sample {} is earlier than the previous event at sample {}",
                index, actual, previous
            ),
        }
    }
}

impl std::error::Error for TimelineError {}
