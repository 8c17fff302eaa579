// SPDX-License-Identifier: MPL-2.0

use crate::cache::schema::SCHEMA;
use crate::cache::{CacheError, KeyValueStore};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Handle to the local SQLite key-value database
#[derive(Clone)]
pub struct CacheDb {
    conn: Arc<Mutex<Connection>>,
}

impl CacheDb {
    /// Open or create the default database
    /// Path: ~/.local/share/pawsfeed/cache.db
    pub fn open() -> Result<Self, CacheError> {
        let path = Self::cache_path()?;
        Self::open_at(&path)
    }

    /// Open or create a database at an explicit path
    pub fn open_at(path: &Path) -> Result<Self, CacheError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CacheError::Path(format!("failed to create cache dir: {}", e)))?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Throwaway database, used by tests and one-shot runs
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run schema migrations
    fn migrate(conn: &Connection) -> Result<(), CacheError> {
        // All statements are CREATE IF NOT EXISTS
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get XDG data directory for cache
    fn cache_path() -> Result<PathBuf, CacheError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CacheError::Path("could not find data directory".to_string()))?;

        Ok(data_dir.join("pawsfeed").join("cache.db"))
    }

    /// Access connection for operations
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("cache lock poisoned")
    }

    /// Get current unix timestamp
    pub fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl KeyValueStore for CacheDb {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let conn = self.conn();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let conn = self.conn();
        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Self::now()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.conn();
        conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        Ok(())
    }
}
