//! Performance files: the on-disk form of a recorded [`Timeline`].
//!
//! A performance is a list of rows `(key_id, sample_time, pressed)` sorted by
//! time, with `pressed` stored as 0 or 1. Three encodings are supported:
//!
//! - JSON (`.json`): `{"rows": [{"key_id": 3, "sample_time": 0, "pressed": 1}, ...]}`
//! - piano (`.piano`): an SQLite database with one table,
//!   `piano(keyid, time, press)`, as written by earlier versions of the
//!   instrument
//! - text (anything else): one `sample_time key_id pressed` row per line,
//!   where `pressed` is `0`/`1` or `True`/`False`; blank lines and lines
//!   starting with `#` are ignored
//!
//! Saving subtracts the first event's time from every row so files do not
//! depend on when in the session the performance was played. Loading keeps
//! times as they are and orders rows by time (stable, so simultaneous events
//! keep their file order).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use rusqlite::{Connection, OpenFlags};
use std::{fmt, fs, io, path::Path};

use crate::sequencing::{Event, Timeline};
use crate::synth::keys::KeyId;

/// One stored event.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceRow {
    pub key_id: KeyId,
    pub sample_time: u64,
    /// 1 = pressed, 0 = released
    pub pressed: u8,
}

/// A whole stored performance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Performance {
    pub rows: Vec<PerformanceRow>,
}

/// File encoding, chosen from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Piano,
    Text,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            Some(ext) if ext.eq_ignore_ascii_case("piano") => Format::Piano,
            _ => Format::Text,
        }
    }
}

impl Performance {
    /// Rows for a recording, normalized so the first event is at time zero.
    pub fn from_timeline(timeline: &Timeline) -> Self {
        Self {
            rows: timeline
                .normalized()
                .iter()
                .map(|e| PerformanceRow {
                    key_id: e.key_id,
                    sample_time: e.sample_time,
                    pressed: e.pressed as u8,
                })
                .collect(),
        }
    }

    /// Validate the rows and turn them into a playback queue.
    pub fn into_timeline(self) -> Result<Timeline, LoadError> {
        let mut events = Vec::with_capacity(self.rows.len());
        for (index, row) in self.rows.into_iter().enumerate() {
            let pressed = match row.pressed {
                0 => false,
                1 => true,
                other => {
                    return Err(LoadError::Parse {
                        line: index + 1,
                        message: format!("pressed must be 0 or 1, got {other}"),
                    })
                }
            };
            events.push(Event::new(row.sample_time, row.key_id, pressed));
        }
        events.sort_by_key(|e| e.sample_time);
        Ok(Timeline::from_events(events)?)
    }

    /// Parse the plain-text encoding.
    pub fn from_text(text: &str) -> Result<Self, LoadError> {
        let mut rows = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            rows.push(parse_text_row(line).map_err(|message| LoadError::Parse {
                line: index + 1,
                message,
            })?);
        }
        Ok(Self { rows })
    }

    /// Render the plain-text encoding.
    pub fn to_text(&self) -> String {
        let mut text = String::from("# sample_time key_id pressed\n");
        for row in &self.rows {
            text.push_str(&format!("{} {} {}\n", row.sample_time, row.key_id, row.pressed));
        }
        text
    }

    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

const PIANO_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS piano(keyid integer NOT NULL, \
     time integer NOT NULL, press integer NOT NULL)";

impl Performance {
    /// Read the rows of a `.piano` database, ordered by time.
    pub fn from_piano(path: &Path) -> Result<Self, LoadError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare("SELECT keyid, time, press FROM piano ORDER BY time")?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?, r.get::<_, i64>(2)?))
        })?;

        let mut performance = Performance::default();
        for (index, row) in rows.enumerate() {
            let (keyid, time, press) = row?;
            let invalid = |what: &str, value: i64| LoadError::Parse {
                line: index + 1,
                message: format!("{what} out of range: {value}"),
            };
            performance.rows.push(PerformanceRow {
                key_id: KeyId::try_from(keyid).map_err(|_| invalid("keyid", keyid))?,
                sample_time: u64::try_from(time).map_err(|_| invalid("time", time))?,
                pressed: u8::try_from(press).map_err(|_| invalid("press", press))?,
            });
        }
        Ok(performance)
    }

    /// Replace the contents of a `.piano` database with these rows.
    pub fn write_piano(&self, path: &Path) -> rusqlite::Result<()> {
        let mut conn = Connection::open(path)?;
        let tx = conn.transaction()?;
        tx.execute(PIANO_SCHEMA, [])?;
        tx.execute("DELETE FROM piano", [])?;
        {
            let mut insert = tx.prepare("INSERT INTO piano(keyid, time, press) VALUES(?1, ?2, ?3)")?;
            for row in &self.rows {
                let time = i64::try_from(row.sample_time)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                insert.execute(rusqlite::params![row.key_id, time, row.pressed])?;
            }
        }
        tx.commit()
    }
}

fn parse_text_row(line: &str) -> Result<PerformanceRow, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [time, key, pressed] = fields.as_slice() else {
        return Err(format!("expected 3 fields, found {}", fields.len()));
    };

    let sample_time = time
        .parse::<u64>()
        .map_err(|e| format!("bad sample time {time:?}: {e}"))?;
    let key_id = key
        .parse::<KeyId>()
        .map_err(|e| format!("bad key id {key:?}: {e}"))?;
    let pressed = match *pressed {
        "1" => 1,
        "0" => 0,
        p if p.eq_ignore_ascii_case("true") => 1,
        p if p.eq_ignore_ascii_case("false") => 0,
        other => return Err(format!("bad pressed flag {other:?}")),
    };

    Ok(PerformanceRow {
        key_id,
        sample_time,
        pressed,
    })
}

/// Write a recording to `path`, encoding chosen from the extension.
pub fn save(path: impl AsRef<Path>, recording: &Timeline) -> io::Result<()> {
    let path = path.as_ref();
    let performance = Performance::from_timeline(recording);
    let text = match Format::from_path(path) {
        Format::Piano => {
            performance.write_piano(path).map_err(io::Error::other)?;
            log::info!("saved {} events to {}", performance.rows.len(), path.display());
            return Ok(());
        }
        #[cfg(feature = "serde")]
        Format::Json => performance.to_json().map_err(io::Error::other)?,
        #[cfg(not(feature = "serde"))]
        Format::Json => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "JSON performances need the `serde` feature",
            ))
        }
        Format::Text => performance.to_text(),
    };
    fs::write(path, text)?;
    log::info!("saved {} events to {}", performance.rows.len(), path.display());
    Ok(())
}

/// Read a performance from `path` as a playback queue.
pub fn load(path: impl AsRef<Path>) -> Result<Timeline, LoadError> {
    let path = path.as_ref();
    let performance = match Format::from_path(path) {
        #[cfg(feature = "serde")]
        Format::Json => Performance::from_json(&fs::read_to_string(path)?)?,
        #[cfg(not(feature = "serde"))]
        Format::Json => return Err(LoadError::Unsupported("json")),
        Format::Piano => Performance::from_piano(path)?,
        Format::Text => Performance::from_text(&fs::read_to_string(path)?)?,
    };
    let timeline = performance.into_timeline()?;
    log::info!("loaded {} events from {}", timeline.len(), path.display());
    Ok(timeline)
}

/// Errors that can occur when loading a performance
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read
    Io(io::Error),
    /// A row is missing fields or holds an invalid value (1-based line/row)
    Parse { line: usize, message: String },
    /// The JSON document is malformed
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
    /// The `.piano` database could not be opened or queried
    Sqlite(rusqlite::Error),
    /// The rows do not form a valid timeline
    Timeline(crate::sequencing::TimelineError),
    /// The encoding is not compiled in
    Unsupported(&'static str),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "Performance file error: {}", e),
            LoadError::Parse { line, message } => {
                write!(f, "Performance parse error on line {}: {}", line, message)
            }
            #[cfg(feature = "serde")]
            LoadError::Json(e) => write!(f, "Performance JSON error: {}", e),
            LoadError::Sqlite(e) => write!(f, "Performance database error: {}", e),
            LoadError::Timeline(e) => write!(f, "Invalid performance: {}", e),
            LoadError::Unsupported(format) => {
                write!(f, "Performance format {} is not supported by this build", format)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            #[cfg(feature = "serde")]
            LoadError::Json(e) => Some(e),
            LoadError::Sqlite(e) => Some(e),
            LoadError::Timeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e)
    }
}

impl From<rusqlite::Error> for LoadError {
    fn from(e: rusqlite::Error) -> Self {
        LoadError::Sqlite(e)
    }
}

impl From<crate::sequencing::TimelineError> for LoadError {
    fn from(e: crate::sequencing::TimelineError) -> Self {
        LoadError::Timeline(e)
    }
}
