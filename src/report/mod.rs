pub mod json;
pub mod markdown;
pub mod section;
pub mod table;

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::delta::{self, Transition};
use crate::error::Result;
use crate::history::History;
use crate::util::write_atomic;

/// How the report file is updated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Replace the whole document.
    #[default]
    Overwrite,
    /// Replace only the marker-delimited section, keep everything else.
    Section,
}

/// One detail row per retained snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Row {
    pub date: NaiveDate,
    pub remaining: u64,
    /// `None` for the oldest entry, which has no predecessor.
    pub consumed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refilled: Option<u64>,
}

/// Detail rows for every snapshot in the history, newest first.
pub fn rows(history: &History) -> Vec<Row> {
    delta::transitions(history)
        .into_iter()
        .rev()
        .map(|(snapshot, transition)| Row {
            date: snapshot.date,
            remaining: snapshot.remaining,
            consumed: transition.map(|t| t.consumed()),
            refilled: match transition {
                Some(Transition::Refill { added }) => Some(added),
                _ => None,
            },
        })
        .collect()
}

/// Write the composed report body to `path`.
pub fn write(path: &Path, body: &str, mode: ReportMode) -> Result<()> {
    let contents = match mode {
        ReportMode::Overwrite => body.to_string(),
        ReportMode::Section => {
            let existing = match std::fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(e.into()),
            };
            section::splice(existing.as_deref(), body)
        }
    };

    write_atomic(path, contents.as_bytes())?;
    Ok(())
}
