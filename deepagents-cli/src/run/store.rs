//! Opens the memories store described by [`StoreConfig`].

use std::sync::Arc;

use deepagents::{InMemoryStore, Store};

use crate::config::{Error, StoreConfig};

#[cfg(feature = "sqlite")]
pub(crate) fn open_store(config: &StoreConfig) -> Result<Arc<dyn Store>, Error> {
    match config {
        StoreConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
        StoreConfig::Sqlite { path } => Ok(Arc::new(deepagents::SqliteStore::new(path)?)),
    }
}

#[cfg(not(feature = "sqlite"))]
pub(crate) fn open_store(config: &StoreConfig) -> Result<Arc<dyn Store>, Error> {
    if let StoreConfig::Sqlite { path } = config {
        tracing::warn!(
            db_path = %path,
            "DB_PATH is set but the sqlite feature is disabled; memories are kept in memory"
        );
    }
    Ok(Arc::new(InMemoryStore::new()))
}
