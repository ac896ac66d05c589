//! Long-term key-value store: trait, namespace and error types.
//!
//! A `Store` holds JSON values under `(namespace, key)`. Namespaces isolate callers
//! (e.g. `["filesystem", user_id]`), and data outlives any single session.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Hierarchical namespace for store entries, e.g. `["filesystem", "u1"]`.
pub type Namespace = Vec<String>;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key not present in the namespace.
    #[error("not found")]
    NotFound,
    /// Value could not be encoded or decoded.
    #[error("serialization: {0}")]
    Serialization(String),
    /// Underlying storage failed (database error, poisoned lock, ...).
    #[error("storage: {0}")]
    Storage(String),
}

/// One entry returned by [`Store::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSearchHit {
    pub key: String,
    pub value: Value,
    /// Relevance score when the store ranks results; `None` for plain filters.
    pub score: Option<f64>,
}

/// Cross-session key-value storage.
///
/// Writes are last-write-wins per key; no transactions or version checks.
///
/// **Interaction**: Used as `Arc<dyn Store>` by [`StoreBackend`](crate::backends::StoreBackend).
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace the value at `key`.
    async fn put(&self, namespace: &Namespace, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Get the value at `key`, or `None` when absent.
    async fn get(&self, namespace: &Namespace, key: &str) -> Result<Option<Value>, StoreError>;

    /// All keys in the namespace, sorted.
    async fn list(&self, namespace: &Namespace) -> Result<Vec<String>, StoreError>;

    /// Entries in the namespace whose key or serialized value contains `query`.
    ///
    /// `query` of `None` or `""` matches everything; `limit` of `None` returns every match.
    /// Hits are ordered by key.
    async fn search(
        &self,
        namespace: &Namespace,
        query: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<StoreSearchHit>, StoreError>;
}

/// True when `key` or `value` contains `query` (empty/absent query matches all).
pub(crate) fn matches_query(query: Option<&str>, key: &str, value: &Value) -> bool {
    match query {
        None => true,
        Some(q) if q.is_empty() => true,
        Some(q) => key.contains(q) || value.to_string().contains(q),
    }
}
