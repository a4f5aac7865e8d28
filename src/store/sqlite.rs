use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::HistoryStore;
use crate::error::{Error, Result};
use crate::history::{History, Snapshot};

/// Get the database path (~/.local/share/quota-trend/history.db or platform equivalent)
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = directories::ProjectDirs::from("", "", "quota-trend")
        .ok_or_else(|| Error::Config("could not determine data directory".to_string()))?
        .data_dir()
        .to_path_buf();

    Ok(data_dir.join("history.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots (
            date TEXT PRIMARY KEY NOT NULL,
            remaining INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per run, reuse for load and persist.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        // a file that is not a database surfaces here, on first access
        init_schema(&conn).map_err(|e| Error::corrupt(path, e))?;
        Ok(SqliteStore { conn, path: path.to_path_buf() })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(SqliteStore { conn, path: PathBuf::from(":memory:") })
    }
}

impl HistoryStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self) -> Result<History> {
        let mut stmt = self.conn.prepare(
            "SELECT date, remaining
             FROM snapshots
             ORDER BY date ASC"
        )?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::corrupt(&self.path, e))?;

        let mut snapshots = Vec::with_capacity(rows.len());
        for (date_str, remaining) in rows {
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .map_err(|e| Error::corrupt(&self.path, format!("bad date '{date_str}': {e}")))?;
            let remaining = u64::try_from(remaining).map_err(|_| {
                Error::corrupt(&self.path, format!("negative remaining {remaining} on {date_str}"))
            })?;
            snapshots.push(Snapshot::new(date, remaining));
        }

        Ok(History::from_snapshots(snapshots))
    }

    fn persist(&mut self, history: &History) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM snapshots", [])?;

        let mut stmt = tx.prepare_cached(
            "INSERT INTO snapshots (date, remaining) VALUES (?1, ?2)"
        )?;

        for snapshot in history.snapshots() {
            let remaining = i64::try_from(snapshot.remaining).map_err(|_| {
                Error::InvalidSnapshot(format!(
                    "remaining {} on {} exceeds the database integer range",
                    snapshot.remaining, snapshot.date
                ))
            })?;
            stmt.execute(params![snapshot.date.format("%Y-%m-%d").to_string(), remaining])?;
        }

        drop(stmt);
        tx.commit()?;

        tracing::debug!(path = %self.path.display(), entries = history.len(), "persisted history");
        Ok(())
    }
}
