//! Durable key-value storage backing the option store.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Host persistence: a flat map from option name to a primitive value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the stored values for `keys`. Keys without a value are absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Write all `entries` in one step. Readers see either none or all of them.
    async fn set(&self, entries: Map<String, Value>) -> Result<()>;
}

/// SQLite-backed store. Values are kept as JSON text.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create storage directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open option database: {}", path.display()))?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS options (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("create options table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("option database lock poisoned"))?;
        let mut stmt = conn.prepare_cached("SELECT value FROM options WHERE key = ?1")?;

        let mut values = Map::new();
        for key in keys {
            let raw: Option<String> = stmt
                .query_row(params![key], |row| row.get(0))
                .optional()
                .with_context(|| format!("read option '{}'", key))?;

            let Some(raw) = raw else { continue };
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => {
                    values.insert(key.to_string(), value);
                }
                Err(e) => debug!(key = *key, error = %e, "ignoring undecodable stored value"),
            }
        }

        Ok(values)
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("option database lock poisoned"))?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO options (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            )?;
            for (key, value) in &entries {
                stmt.execute(params![key, value.to_string()])
                    .with_context(|| format!("write option '{}'", key))?;
            }
        }
        tx.commit().context("commit option write")?;
        Ok(())
    }
}

/// Open the SQLite store at `path`.
///
/// When the database cannot be opened, options fall back to an in-process
/// store and last only for this run.
pub fn open_backend(path: &Path) -> Arc<dyn KeyValueStore> {
    match SqliteStore::open(path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %format!("{:#}", e),
                "option storage unavailable, keeping options in memory"
            );
            Arc::new(MemoryStore::new())
        }
    }
}

/// In-process store, used when the database cannot be opened and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw values, valid or not.
    #[cfg(test)]
    pub fn with_entries(values: Map<String, Value>) -> Self {
        Self {
            values: Mutex::new(values),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(keys
            .iter()
            .filter_map(|k| values.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        values.extend(entries);
        Ok(())
    }
}
