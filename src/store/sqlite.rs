//! SQLite-backed store adapter. The database holds a single key/value table;
//! collections are stored as JSON text blobs rather than normalized rows so
//! the persisted layout stays a pair of independent serialized collections.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{StoreAdapter, StoreError};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-loan-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";

/// Durable store kept in a per-user SQLite file. One connection per session;
/// all access is synchronous, matching the single-actor model of the app.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and lazily create) the store in the user's home directory.
    /// Fatal here is fine: if we cannot even open the database the session
    /// starts with an ephemeral [`super::MemoryStore`] instead, a decision
    /// made by the caller, not by this type.
    pub fn open_default() -> Result<Self> {
        let path = default_db_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
        let store = Self::open(&path)?;
        info!(path = %path.display(), "opened durable store");
        Ok(store)
    }

    /// Open the store at an explicit path. Split out from `open_default` so
    /// tests can point it at a temp directory.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open SQLite database")?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("failed to create kv_store table")?;
        Ok(Self { conn })
    }
}

impl StoreAdapter for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Read {
                key: key.to_string(),
                reason: err.to_string(),
            })
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|err| StoreError::Write {
                key: key.to_string(),
                reason: err.to_string(),
            })?;
        Ok(())
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(&dir.path().join("t.sqlite")).expect("open store");

        store.save("books", "[{\"id\":\"b1\"}]").expect("save");
        let loaded = store.load("books").expect("load");
        assert_eq!(loaded.as_deref(), Some("[{\"id\":\"b1\"}]"));
    }

    #[test]
    fn save_replaces_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(&dir.path().join("t.sqlite")).expect("open store");

        store.save("loans", "[]").expect("first save");
        store.save("loans", "[1]").expect("second save");
        assert_eq!(store.load("loans").expect("load").as_deref(), Some("[1]"));
    }

    #[test]
    fn missing_key_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(&dir.path().join("t.sqlite")).expect("open store");

        assert!(store.load("never-written").expect("load").is_none());
    }
}
