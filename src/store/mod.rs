//! Durable history storage.
//!
//! Two backends share one contract:
//! - json: a single `{ "YYYY-MM-DD": remaining }` document, replaced atomically
//! - sqlite: one row per date, replaced inside a single transaction
//!
//! `load` returns an empty history when nothing has been stored yet and fails
//! with `CorruptState` when something was stored but cannot be read back.
//! `persist` writes the full history; a failed persist leaves the previously
//! stored history in place.

pub mod json;
pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::history::History;

pub trait HistoryStore {
    fn name(&self) -> &'static str;
    fn load(&self) -> Result<History>;
    fn persist(&mut self, history: &History) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

/// Open the backend selected by the configuration.
pub fn open(config: &Config) -> Result<Box<dyn HistoryStore>> {
    match config.store_backend {
        Backend::Json => Ok(Box::new(json::JsonFileStore::new(config.data_file.clone()))),
        Backend::Sqlite => {
            let path = match &config.database_file {
                Some(path) => path.clone(),
                None => sqlite::default_db_path()?,
            };
            Ok(Box::new(sqlite::SqliteStore::open(&path)?))
        }
    }
}
