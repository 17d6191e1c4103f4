//! Append-only interaction log
//!
//! Every completed request is appended to a SQLite table inside the
//! workspace. The dispatcher only ever writes; reads exist for inspection
//! tooling and tests. The database is opened and closed per operation, so a
//! handle is just a path.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::Result;

/// One recorded request/response pair. Immutable once written.
#[derive(Debug, Clone)]
pub struct InteractionRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub user_input: String,
    pub response: String,
}

/// Handle on the interaction log at a fixed path.
#[derive(Debug, Clone)]
pub struct InteractionMemory {
    db_path: PathBuf,
}

impl InteractionMemory {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Create the database and schema if absent. Never destructive.
    pub fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS interactions (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME,
                user_input TEXT,
                response TEXT
            )",
            [],
        )?;
        Ok(())
    }

    /// Append one record with a server-assigned timestamp; returns its id.
    ///
    /// Ids are SQLite rowids, so they increase monotonically with append
    /// order.
    pub fn record(&self, user_input: &str, response: &str) -> Result<i64> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO interactions (timestamp, user_input, response) VALUES (?1, ?2, ?3)",
            params![Utc::now().to_rfc3339(), user_input, response],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// The most recent records, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<InteractionRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, user_input, response FROM interactions
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let ts: String = row.get(1)?;
            let timestamp = DateTime::parse_from_rfc3339(&ts)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?
                .with_timezone(&Utc);
            Ok(InteractionRecord {
                id: row.get(0)?,
                timestamp,
                user_input: row.get(2)?,
                response: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Total number of recorded interactions.
    pub fn count(&self) -> Result<i64> {
        let conn = self.open()?;
        let count = conn.query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn open(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }
}
