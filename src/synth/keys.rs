//! Key numbering, tuning and single-character names.
//!
//! Key ids are dense: `octave * 12 + note`, starting at 0. Key 0 is number 36
//! on the 88-key reference numbering where key 49 is A4 = 440 Hz, so key 0
//! sounds G#3 (≈207.65 Hz), key 1 is A3 and key 13 is A4.

use crate::config::KEYS_PER_OCTAVE;

pub type KeyId = u32;

/// Offset from key ids to the 88-key reference numbering.
const REFERENCE_OFFSET: f64 = 36.0;
/// Reference key number tuned to 440 Hz.
const REFERENCE_A4: f64 = 49.0;
/// Printable ASCII characters from 'A' (65) through '~' (126).
const NAME_SPAN: u32 = 62;

/// Equal-tempered frequency of a key in Hz.
pub fn key_frequency(id: KeyId) -> f64 {
    440.0 * 2.0_f64.powf((id as f64 + REFERENCE_OFFSET - REFERENCE_A4) / 12.0)
}

/// Key id for a note (0-11) within an octave.
pub fn key_id(octave: usize, note: usize) -> KeyId {
    (octave * KEYS_PER_OCTAVE + note % KEYS_PER_OCTAVE) as KeyId
}

/// Position within the octave (0 = C).
pub fn note_in_octave(id: KeyId) -> usize {
    id as usize % KEYS_PER_OCTAVE
}

/// Whether the key is a sharp/flat.
pub fn is_black(id: KeyId) -> bool {
    matches!(note_in_octave(id), 1 | 3 | 6 | 8 | 10)
}

/// Single-character name: 'A' for key 0, 'B' for key 1, and so on through
/// the printable ASCII range, wrapping after '~'.
///
/// Names are matched case-insensitively, so on a keyboard of more than 32
/// keys a lowercase name (key 32 is 'a') shares its label with an uppercase
/// one; typing that letter plays both keys.
pub fn key_name(id: KeyId) -> char {
    char::from(b'A' + (id % NAME_SPAN) as u8)
}

/// Whether a typed label selects this key.
pub fn label_matches(label: char, id: KeyId) -> bool {
    label.eq_ignore_ascii_case(&key_name(id))
}
