//! Key-value persistence for saved games and statistics.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StoreKey {
    ClassicGame,
    ClassicStats,
    TimeAttackStats,
}

/// Blob storage the engines save to and restore from.
pub trait PersistencePort: Send + Sync {
    fn save(&self, key: StoreKey, blob: &str) -> Result<(), StoreError>;
    fn load(&self, key: StoreKey) -> Result<Option<String>, StoreError>;
    fn remove(&self, key: StoreKey) -> Result<(), StoreError>;
}

/// Serialize `value` and save it, logging instead of failing.
pub fn save_json<T: Serialize>(store: &dyn PersistencePort, key: StoreKey, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(StoreError::from)
        .and_then(|blob| store.save(key, &blob));
    if let Err(e) = result {
        tracing::warn!(%key, "Failed to save state: {e}");
    }
}

/// Load and deserialize the blob under `key`. Unreadable blobs count as missing.
pub fn load_json<T: DeserializeOwned>(store: &dyn PersistencePort, key: StoreKey) -> Option<T> {
    match store.load(key) {
        Ok(Some(blob)) => match serde_json::from_str(&blob) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%key, "Ignoring unreadable saved state: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(%key, "Failed to load state: {e}");
            None
        }
    }
}

pub fn remove_key(store: &dyn PersistencePort, key: StoreKey) {
    if let Err(e) = store.remove(key) {
        tracing::warn!(%key, "Failed to remove state: {e}");
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn blobs(&self) -> MutexGuard<'_, HashMap<StoreKey, String>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistencePort for MemoryStore {
    fn save(&self, key: StoreKey, blob: &str) -> Result<(), StoreError> {
        self.blobs().insert(key, blob.to_string());
        Ok(())
    }

    fn load(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.blobs().get(&key).cloned())
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.blobs().remove(&key);
        Ok(())
    }
}

/// SQLite-backed store, one row per key.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at the default state path, creating it if needed.
    pub fn new() -> Result<Self, StoreError> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| "wordladder_state.db".into());
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                blob TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistencePort for SqliteStore {
    fn save(&self, key: StoreKey, blob: &str) -> Result<(), StoreError> {
        self.conn().execute(
            r#"
            INSERT INTO kv_store (key, blob, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at
            "#,
            params![key.to_string(), blob, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let blob = self
            .conn()
            .query_row(
                "SELECT blob FROM kv_store WHERE key = ?1",
                [key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn remove(&self, key: StoreKey) -> Result<(), StoreError> {
        self.conn()
            .execute("DELETE FROM kv_store WHERE key = ?1", [key.to_string()])?;
        Ok(())
    }
}
