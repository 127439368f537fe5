//! SQLite store for persistent caching.

use super::KeyValueStore;
use crate::error::CacheError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed key-value store
///
/// Uses WAL (Write-Ahead Logging) mode so readers are not blocked by writers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::OpenFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| CacheError::OpenFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Self::init(conn, path.to_path_buf())
    }

    /// A throwaway database that lives as long as the store
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().map_err(|e| CacheError::OpenFailed {
            path: ":memory:".to_string(),
            reason: e.to_string(),
        })?;
        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, db_path: PathBuf) -> Result<Self, CacheError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Unavailable(format!("{} lock poisoned", self.db_path.display())))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let conn = self.lock()?;

        conn.query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
        .map_err(|e| CacheError::QueryFailed(e.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, chrono::Utc::now().timestamp()],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM kv_store WHERE key = ?", [key])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT key FROM kv_store WHERE substr(key, 1, ?2) = ?1 ORDER BY key")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        let keys = stmt
            .query_map(params![prefix, prefix.chars().count() as i64], |row| {
                row.get::<_, String>(0)
            })
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sqlite_store_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("cache.db");

        let store = SqliteStore::open(&db_path).unwrap();

        assert!(db_path.exists());
        assert!(store.keys("").unwrap().is_empty());
    }

    #[test]
    fn sqlite_store_round_trips_values() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.set("analysis:abc", "{\"x\":1}").unwrap();

        assert_eq!(store.get("analysis:abc").unwrap().as_deref(), Some("{\"x\":1}"));
        assert!(store.get("analysis:def").unwrap().is_none());
    }

    #[test]
    fn sqlite_store_overwrites_and_deletes() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));

        store.delete("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn sqlite_store_lists_keys_by_prefix() {
        let store = SqliteStore::open_in_memory().unwrap();

        store.set("analysis:2", "v").unwrap();
        store.set("analysis:1", "v").unwrap();
        store.set("other:1", "v").unwrap();

        assert_eq!(store.keys("analysis:").unwrap(), vec!["analysis:1", "analysis:2"]);
    }
}
