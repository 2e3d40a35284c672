//! The local store: a durable, expiring key-value cache for the CLI.
//!
//! A [`Store`] owns exactly one handle to an embedded SQLite database rooted
//! at `<home>/<application>/<database>/`. Every operation is gated on the
//! connected state: once [`Store::disconnect`] succeeds the instance is
//! permanently unusable and a new Store must be constructed. Absence of a key
//! is a first-class outcome, never an error, so the store can serve as a
//! cache where "miss" is silent.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::core::db;
use crate::core::error::LimpetError;
use crate::core::paths;
use crate::core::time;

const STORE_DB_NAME: &str = "cache.db";

/// `expires_at` holds unix-epoch milliseconds; NULL means the entry never
/// expires.
const ENTRIES_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS entries (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    expires_at INTEGER
)";

/// Embedded key-value store with an explicit connect/disconnect lifecycle.
pub struct Store {
    conn: Option<Connection>,
    path: PathBuf,
}

/// Serializable view of the store's location and connection state.
#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub path: String,
    pub connected: bool,
}

impl Store {
    /// Open (creating on first use) the store at
    /// `<home>/<application>/<database>/` and return a connected handle.
    pub fn connect(application: &str, database: &str) -> Result<Self, LimpetError> {
        Self::open_at(paths::store_root(application, database)?)
    }

    /// Open the store at an explicit root directory.
    ///
    /// The directory chain is created if absent. A live Store holds the
    /// engine's exclusive file lock, so opening a path that another Store
    /// (in this or any other process) already holds fails with
    /// [`LimpetError::Open`] rather than silently sharing state.
    pub fn open_at(root: impl Into<PathBuf>) -> Result<Self, LimpetError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let db_path = root.join(STORE_DB_NAME);
        let conn = db::db_connect(&db_path).map_err(|source| LimpetError::Open {
            path: db_path.clone(),
            source,
        })?;
        // First access on the connection; under exclusive locking this also
        // takes the file lock for the lifetime of the handle.
        conn.execute(ENTRIES_SCHEMA, [])
            .map_err(|source| LimpetError::Open {
                path: db_path,
                source,
            })?;
        Ok(Self {
            conn: Some(conn),
            path: root,
        })
    }

    /// True only between a successful open and an explicit disconnect.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// The storage root this store was opened at. Immutable once opened.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            path: self.path.display().to_string(),
            connected: self.is_connected(),
        }
    }

    fn conn(&self) -> Result<&Connection, LimpetError> {
        self.conn.as_ref().ok_or(LimpetError::NotConnected)
    }

    /// Write or overwrite an entry. Overwriting replaces both the value and
    /// the expiration in one statement.
    ///
    /// A `ttl` of zero means the entry never expires; any other `ttl`
    /// schedules expiration from the moment of the write. The empty string
    /// is accepted as a key and stored like any other key.
    pub fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), LimpetError> {
        let conn = self.conn()?;
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(time::now_epoch_millis() + ttl.as_millis() as i64)
        };
        conn.execute(
            "INSERT OR REPLACE INTO entries (key, value, expires_at) VALUES (?1, ?2, ?3)",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    /// Retrieve the value for `key`, or an empty string when the key is
    /// absent or its expiration has elapsed. Callers cannot distinguish
    /// "never set" from "expired" through this call.
    pub fn get(&self, key: &str) -> Result<String, LimpetError> {
        let conn = self.conn()?;
        let row: Option<(String, Option<i64>)> = conn
            .query_row(
                "SELECT value, expires_at FROM entries WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        match row {
            // Expired entries read as absent; reclamation is GC's job.
            Some((_, Some(expires_at))) if expires_at <= time::now_epoch_millis() => {
                Ok(String::new())
            }
            Some((value, _)) => Ok(value),
            None => Ok(String::new()),
        }
    }

    /// Irreversibly erase every key in the store.
    pub fn flush(&self) -> Result<(), LimpetError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM entries", [])?;
        Ok(())
    }

    /// Purge expired entries and reclaim free pages from the database file.
    ///
    /// Advisory maintenance, not required for correctness. When there is
    /// nothing to reclaim the call is a successful no-op.
    pub fn garbage_collection(&self) -> Result<(), LimpetError> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            params![time::now_epoch_millis()],
        )?;
        let freelist: i64 = conn.query_row("PRAGMA freelist_count;", [], |row| row.get(0))?;
        if freelist == 0 {
            return Ok(());
        }
        // incremental_vacuum may or may not produce rows depending on the
        // SQLite build; drain whatever comes back.
        let mut stmt = conn.prepare("PRAGMA incremental_vacuum;")?;
        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}
        Ok(())
    }

    /// Checkpoint buffered writes to disk and close the engine handle.
    ///
    /// One-way: afterwards every operation, including a second disconnect,
    /// returns [`LimpetError::NotConnected`]. The handle is released even
    /// when the close itself reports a failure.
    pub fn disconnect(&mut self) -> Result<(), LimpetError> {
        let conn = self.conn.take().ok_or(LimpetError::NotConnected)?;
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))
            .map_err(LimpetError::Close)?;
        conn.close().map_err(|(_, source)| LimpetError::Close(source))?;
        Ok(())
    }
}
