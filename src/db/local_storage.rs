//! Local key-value storage over the `kv` table.
//!
//! Every operation is infallible from the caller's point of view: a failed
//! read yields `None` (or the type's default for JSON reads) and a failed write
//! is dropped after a `warn!`. Durability is best-effort, the same guarantee a
//! browser's local storage gives.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Namespace prepended to every key.
pub const KEY_PREFIX: &str = "aiforge:";

#[derive(Clone)]
pub struct LocalStorage {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStorage {
    /// Open the on-disk store at `path`, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = super::open_database(path)?;
        Ok(Self::from_connection(conn))
    }

    /// A throwaway store backed by an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = super::open_memory_database()?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Shared handle on the underlying connection (health checks).
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        let full_key = format!("{KEY_PREFIX}{key}");
        let conn = self.lock();
        match conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![full_key],
                |row| row.get::<_, String>(0),
            )
            .optional()
        {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %full_key, error = %e, "storage read failed");
                None
            }
        }
    }

    pub fn set_item(&self, key: &str, value: &str) {
        let full_key = format!("{KEY_PREFIX}{key}");
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.lock();
        if let Err(e) = conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![full_key, value, now],
        ) {
            tracing::warn!(key = %full_key, error = %e, "storage write dropped");
        }
    }

    pub fn remove_item(&self, key: &str) {
        let full_key = format!("{KEY_PREFIX}{key}");
        let conn = self.lock();
        if let Err(e) = conn.execute("DELETE FROM kv WHERE key = ?1", params![full_key]) {
            tracing::warn!(key = %full_key, error = %e, "storage delete dropped");
        }
    }

    /// All keys under the namespace, with the prefix stripped, sorted.
    pub fn keys(&self) -> Vec<String> {
        let conn = self.lock();
        let result = conn
            .prepare("SELECT key FROM kv WHERE key LIKE ?1 ORDER BY key")
            .and_then(|mut stmt| {
                stmt.query_map(params![format!("{KEY_PREFIX}%")], |row| {
                    row.get::<_, String>(0)
                })?
                .collect::<Result<Vec<_>, _>>()
            });
        match result {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(KEY_PREFIX).map(str::to_string))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "storage key listing failed");
                Vec::new()
            }
        }
    }

    /// Read a JSON value, falling back to `T::default()` when the key is
    /// missing or the stored text does not parse.
    pub fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.get_item(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is not valid JSON, using default");
                T::default()
            }
        }
    }

    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_item(key, &raw),
            Err(e) => tracing::warn!(key, error = %e, "failed to encode value, write dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let storage = LocalStorage::in_memory().unwrap();
        assert_eq!(storage.get_item("greeting"), None);

        storage.set_item("greeting", "hello");
        assert_eq!(storage.get_item("greeting").as_deref(), Some("hello"));

        storage.set_item("greeting", "hi");
        assert_eq!(storage.get_item("greeting").as_deref(), Some("hi"));

        storage.remove_item("greeting");
        assert_eq!(storage.get_item("greeting"), None);
    }

    #[test]
    fn keys_are_namespaced() {
        let storage = LocalStorage::in_memory().unwrap();
        storage.set_item("b", "2");
        storage.set_item("a", "1");
        assert_eq!(storage.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn corrupt_json_reads_as_default() {
        let storage = LocalStorage::in_memory().unwrap();
        storage.set_item("list", "{not json");
        let value: Vec<String> = storage.read_json("list");
        assert!(value.is_empty());
    }

    #[test]
    fn write_failure_is_swallowed() {
        let storage = LocalStorage::in_memory().unwrap();
        storage
            .connection()
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE kv")
            .unwrap();

        storage.set_item("k", "v");
        assert_eq!(storage.get_item("k"), None);
        assert!(storage.keys().is_empty());
    }
}
