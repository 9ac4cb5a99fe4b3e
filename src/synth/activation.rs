//! Per-key activation sources shared between the UI and audio threads.
//!
//! A key is "hot" when any of three independent sources holds it down:
//! the pointer (manual), the computer keyboard (keyed), or performance
//! playback. Each key stores the three as bits of one `AtomicU8`, so every
//! source can be flipped from its own thread without a lock and the audio
//! thread reads a consistent snapshot with a single load.

use std::sync::atomic::{AtomicU8, Ordering};

use super::keys::{label_matches, KeyId};

/// Who is holding a key down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Source {
    Manual = 0b001,
    Keyed = 0b010,
    Playback = 0b100,
}

impl Source {
    #[inline]
    fn bit(self) -> u8 {
        self as u8
    }
}

/// Snapshot of a key's three activation sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activation(u8);

impl Activation {
    pub const NONE: Activation = Activation(0);

    pub fn holds(self, source: Source) -> bool {
        self.0 & source.bit() != 0
    }

    /// Effective key state: manual OR keyed OR playback.
    #[inline]
    pub fn is_hot(self) -> bool {
        is_hot(
            self.holds(Source::Manual),
            self.holds(Source::Keyed),
            self.holds(Source::Playback),
        )
    }
}

/// The combinator every hot/cold decision goes through.
#[inline]
pub const fn is_hot(manual: bool, keyed: bool, playback: bool) -> bool {
    manual || keyed || playback
}

/// Fixed-size table of activation bitsets, indexed by key id.
#[derive(Debug)]
pub struct ActivationTable {
    flags: Box<[AtomicU8]>,
}

impl ActivationTable {
    pub fn new(keys: usize) -> Self {
        Self {
            flags: (0..keys).map(|_| AtomicU8::new(0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Set or clear one source on one key.
    ///
    /// Returns `Some(changed)`, or `None` when the key does not exist.
    /// Setting a source to the value it already has is not a change.
    pub fn set(&self, id: KeyId, source: Source, held: bool) -> Option<bool> {
        let flag = self.flags.get(id as usize)?;
        let previous = if held {
            flag.fetch_or(source.bit(), Ordering::AcqRel)
        } else {
            flag.fetch_and(!source.bit(), Ordering::AcqRel)
        };
        Some(Activation(previous).holds(source) != held)
    }

    /// Apply a typed label to every key whose name matches it.
    ///
    /// Returns true if any key changed.
    pub fn set_label(&self, label: char, held: bool) -> bool {
        let mut changed = false;
        for id in 0..self.flags.len() as KeyId {
            if label_matches(label, id) {
                changed |= self.set(id, Source::Keyed, held).unwrap_or(false);
            }
        }
        changed
    }

    /// Release one source on every key.
    pub fn clear_source(&self, source: Source) {
        for flag in self.flags.iter() {
            flag.fetch_and(!source.bit(), Ordering::AcqRel);
        }
    }

    pub fn get(&self, id: KeyId) -> Activation {
        self.flags
            .get(id as usize)
            .map(|flag| Activation(flag.load(Ordering::Acquire)))
            .unwrap_or(Activation::NONE)
    }

    pub fn is_hot(&self, id: KeyId) -> bool {
        self.get(id).is_hot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_is_or_of_sources() {
        for bits in 0u8..8 {
            let a = Activation(bits);
            assert_eq!(a.is_hot(), bits != 0);
        }
        assert!(is_hot(false, false, true));
        assert!(!is_hot(false, false, false));
    }

    #[test]
    fn repeated_set_is_not_a_change() {
        let table = ActivationTable::new(12);
        assert_eq!(table.set(3, Source::Manual, true), Some(true));
        assert_eq!(table.set(3, Source::Manual, true), Some(false));
        assert_eq!(table.set(3, Source::Manual, false), Some(true));
        assert_eq!(table.set(3, Source::Manual, false), Some(false));
    }

    #[test]
    fn sources_are_independent() {
        let table = ActivationTable::new(12);
        table.set(5, Source::Manual, true);
        table.set(5, Source::Playback, true);
        table.set(5, Source::Manual, false);

        let a = table.get(5);
        assert!(a.is_hot());
        assert!(a.holds(Source::Playback));
        assert!(!a.holds(Source::Manual));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let table = ActivationTable::new(12);
        assert_eq!(table.set(12, Source::Manual, true), None);
        assert!(!table.is_hot(12));
    }

    #[test]
    fn label_presses_every_matching_key() {
        let table = ActivationTable::new(36);
        assert!(table.set_label('a', true));
        assert!(table.is_hot(0));
        assert!(table.is_hot(32));
        assert!(!table.set_label('A', true));
        assert!(!table.set_label('?', true));
    }

    #[test]
    fn clear_source_leaves_others() {
        let table = ActivationTable::new(12);
        table.set(0, Source::Playback, true);
        table.set(1, Source::Playback, true);
        table.set(1, Source::Keyed, true);

        table.clear_source(Source::Playback);

        assert!(!table.is_hot(0));
        assert!(table.is_hot(1));
    }
}
