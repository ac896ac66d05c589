//! SQLite-backed Store: entries survive process restarts.
//!
//! One table keyed by `(ns, key)`; the namespace is stored JSON-encoded and values as JSON text.
//! Calls run on the blocking pool so the async executor never waits on disk.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::memory::store::{matches_query, Namespace, Store, StoreError, StoreSearchHit};

/// Persistent store in a single SQLite file.
///
/// **Interaction**: Used as `Arc<dyn Store>` by [`StoreBackend`](crate::backends::StoreBackend)
/// when the CLI is given `DB_PATH`.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Storage(e.to_string()))?;
        Self::init(conn)
    }

    /// In-memory database; same semantics, nothing written to disk.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Storage(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS store (
                ns TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (ns, key)
            )",
            [],
        )
        .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn ns_key(namespace: &Namespace) -> Result<String, StoreError> {
        serde_json::to_string(namespace).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Runs `f` with the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn put(&self, namespace: &Namespace, key: &str, value: &Value) -> Result<(), StoreError> {
        let ns = Self::ns_key(namespace)?;
        let key = key.to_string();
        let value =
            serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO store (ns, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(ns, key) DO UPDATE SET value = excluded.value",
                params![ns, key, value],
            )
            .map(|_| ())
            .map_err(|e| StoreError::Storage(e.to_string()))
        })
        .await
    }

    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Value>, StoreError> {
        let ns = Self::ns_key(namespace)?;
        let key = key.to_string();
        let raw: Option<String> = self
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM store WHERE ns = ?1 AND key = ?2",
                    params![ns, key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| StoreError::Storage(e.to_string()))
            })
            .await?;
        raw.map(|s| serde_json::from_str(&s).map_err(|e| StoreError::Serialization(e.to_string())))
            .transpose()
    }

    async fn list(&self, namespace: &Namespace) -> Result<Vec<String>, StoreError> {
        let ns = Self::ns_key(namespace)?;
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare("SELECT key FROM store WHERE ns = ?1 ORDER BY key")
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let rows = stmt
                .query_map(params![ns], |row| row.get::<_, String>(0))
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| StoreError::Storage(e.to_string()))
        })
        .await
    }

    async fn search(
        &self,
        namespace: &Namespace,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<StoreSearchHit>, StoreError> {
        let ns = Self::ns_key(namespace)?;
        let rows: Vec<(String, String)> = self
            .with_conn(move |conn| {
                let mut stmt = conn
                    .prepare("SELECT key, value FROM store WHERE ns = ?1 ORDER BY key")
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
                let rows = stmt
                    .query_map(params![ns], |row| Ok((row.get(0)?, row.get(1)?)))
                    .map_err(|e| StoreError::Storage(e.to_string()))?;
                rows.collect::<Result<Vec<_>, _>>()
                    .map_err(|e| StoreError::Storage(e.to_string()))
            })
            .await?;

        let mut hits = Vec::new();
        for (key, raw) in rows {
            let value: Value =
                serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))?;
            if matches_query(query, &key, &value) {
                hits.push(StoreSearchHit {
                    key,
                    value,
                    score: None,
                });
            }
            if limit.is_some_and(|n| hits.len() >= n) {
                break;
            }
        }
        Ok(hits)
    }
}
