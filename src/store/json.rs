//! JSON document storage.
//!
//! Canonical layout is a flat object keyed by ISO date:
//!
//! ```json
//! { "2024-01-01": 100, "2024-01-02": 80 }
//! ```
//!
//! Older documents that stored the whole API envelope per date
//! (`{ "code": 0, "msg": "ok", "data": { "points": 100 } }`) or a
//! `{ "remaining": 100 }` object are still readable. Writes always use the
//! canonical layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use super::HistoryStore;
use crate::error::{Error, Result};
use crate::history::{History, Snapshot, MAX_REMAINING};
use crate::util::write_atomic;

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredReading {
    Plain(u64),
    Remaining { remaining: u64 },
    Envelope { data: EnvelopeData },
}

#[derive(Deserialize)]
struct EnvelopeData {
    points: u64,
}

impl StoredReading {
    fn remaining(&self) -> u64 {
        match self {
            StoredReading::Plain(n) => *n,
            StoredReading::Remaining { remaining } => *remaining,
            StoredReading::Envelope { data } => data.points,
        }
    }
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn parse(path: &Path, content: &str) -> Result<History> {
    let raw: BTreeMap<String, StoredReading> =
        serde_json::from_str(content).map_err(|e| Error::corrupt(path, e))?;

    let mut snapshots = Vec::with_capacity(raw.len());
    for (key, reading) in raw {
        let date = NaiveDate::parse_from_str(&key, "%Y-%m-%d")
            .map_err(|e| Error::corrupt(path, format!("bad date key '{key}': {e}")))?;
        let remaining = reading.remaining();
        if remaining > MAX_REMAINING {
            return Err(Error::corrupt(path, format!("remaining {remaining} on {key} is out of range")));
        }
        snapshots.push(Snapshot::new(date, remaining));
    }

    Ok(History::from_snapshots(snapshots))
}

pub fn render(history: &History) -> Result<String> {
    let doc: BTreeMap<String, u64> = history
        .snapshots()
        .map(|s| (s.date.format("%Y-%m-%d").to_string(), s.remaining))
        .collect();

    let mut out = serde_json::to_string_pretty(&doc)?;
    out.push('\n');
    Ok(out)
}

impl HistoryStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json"
    }

    fn load(&self) -> Result<History> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no history file yet");
                return Ok(History::new());
            }
            Err(e) => return Err(e.into()),
        };

        let history = parse(&self.path, &content)?;
        tracing::debug!(path = %self.path.display(), entries = history.len(), "loaded history");
        Ok(history)
    }

    fn persist(&mut self, history: &History) -> Result<()> {
        let content = render(history)?;
        write_atomic(&self.path, content.as_bytes())?;
        tracing::debug!(path = %self.path.display(), entries = history.len(), "persisted history");
        Ok(())
    }
}
