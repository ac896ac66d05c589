//! Backend stack description: filesystem at `/`, store-backed memories at a prefix.
//!
//! Built by [`RunConfig::backend_config`](super::RunConfig::backend_config); assembled into a
//! `CompositeBackend` by [`build_backend`](crate::build_backend).

use std::fmt;
use std::path::PathBuf;

/// Where the memories store keeps its data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreConfig {
    /// Process memory; gone when the command exits.
    InMemory,
    /// SQLite file; survives across invocations (feature `sqlite`).
    Sqlite { path: String },
}

/// Backend stack for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    pub root_dir: PathBuf,
    pub max_file_size_mb: u64,
    pub memories_prefix: String,
    pub store: StoreConfig,
    pub user_id: Option<String>,
}

impl fmt::Display for BackendConfig {
    /// One-line summary for debug logs, e.g. `/ -> ./ | /memories/ -> sqlite:mem.db (user u1)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/ -> {}", self.root_dir.display())?;
        match &self.store {
            StoreConfig::InMemory => write!(f, " | {} -> in-memory", self.memories_prefix)?,
            StoreConfig::Sqlite { path } => {
                write!(f, " | {} -> sqlite:{}", self.memories_prefix, path)?
            }
        }
        if let Some(user) = &self.user_id {
            write!(f, " (user {})", user)?;
        }
        Ok(())
    }
}
