//! Error types for the usage pipeline.

use std::path::PathBuf;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetched or supplied reading has no usable `remaining` value.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Stored history exists but cannot be parsed. Never auto-recovered.
    #[error("corrupt history at {}: {reason}", .path.display())]
    CorruptState { path: PathBuf, reason: String },

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("metering endpoint returned {status}: {body}")]
    FetchStatus { status: u16, body: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::CorruptState {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
