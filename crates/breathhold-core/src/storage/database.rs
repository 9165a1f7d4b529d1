//! SQLite-backed key-value storage.
//!
//! Provides persistent storage for:
//! - The progress ledger (one JSON blob)
//! - Session history (one JSON array, capped to the most recent entries)
//! - Key-value store for application state

use rusqlite::{params, Connection};
use std::path::Path;

use super::data_dir;
use super::gateway::ProgressStore;
use crate::error::{DatabaseError, Result};
use crate::progress::Progress;
use crate::session::Session;

pub const PROGRESS_KEY: &str = "progress";
pub const HISTORY_KEY: &str = "session_history";

/// Number of sessions kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// SQLite database holding the ledger and session history.
pub struct Database {
    conn: Connection,
    history_limit: usize,
}

impl Database {
    /// Open the database at `~/.config/breathhold/breathhold.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("breathhold.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn,
            history_limit: DEFAULT_HISTORY_LIMIT,
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            history_limit: DEFAULT_HISTORY_LIMIT,
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn read_history(&self) -> Result<Vec<Session>> {
        match self.kv_get(HISTORY_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}

impl ProgressStore for Database {
    fn load_progress(&self) -> Progress {
        let raw = match self.kv_get(PROGRESS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Progress::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read progress; using defaults");
                return Progress::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored progress is unreadable; using defaults");
            Progress::default()
        })
    }

    fn save_progress(&self, progress: &Progress) -> Result<()> {
        let json = serde_json::to_string(progress)?;
        self.kv_set(PROGRESS_KEY, &json)?;
        Ok(())
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        let mut history = self.read_history().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Session history is unreadable; starting a new one");
            Vec::new()
        });
        history.push(session.clone());
        if history.len() > self.history_limit {
            let overflow = history.len() - self.history_limit;
            history.drain(..overflow);
        }
        let json = serde_json::to_string(&history)?;
        self.kv_set(HISTORY_KEY, &json)?;
        Ok(())
    }

    fn load_history(&self) -> Vec<Session> {
        self.read_history().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load session history");
            Vec::new()
        })
    }
}
