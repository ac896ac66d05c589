//! Run config: filesystem root, memories store and mount prefix. Filled from env / .env.
//!
//! Interacts with [`RunOptions`](super::RunOptions) via [`RunConfig::apply_options`] and
//! produces the [`BackendConfig`](super::BackendConfig) that `run` assembles.

use std::path::PathBuf;

use deepagents::backends::DEFAULT_MAX_FILE_SIZE_MB;

use super::{BackendConfig, RunOptions, StoreConfig};

/// Error type used for config loading and runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Default mount prefix of the persistent store.
pub const DEFAULT_MEMORIES_PREFIX: &str = "/memories/";


/// Run config for one tool call.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Directory served at `/` by the filesystem backend.
    pub root_dir: PathBuf,
    /// SQLite database for the memories store. `None` keeps memories in process memory.
    pub db_path: Option<String>,
    /// User id scoping the memories namespace.
    pub user_id: Option<String>,
    /// Mount prefix of the memories store, e.g. `/memories/`.
    pub memories_prefix: String,
    /// Files above this size (MB) are skipped by grep.
    pub max_file_size_mb: u64,
    /// When true, print the backend stack summary before running.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            db_path: None,
            user_id: None,
            memories_prefix: DEFAULT_MEMORIES_PREFIX.to_string(),
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Fill config from env vars (and .env). Call `dotenv` first or use [`run`](crate::run).
    ///
    /// `ROOT_DIR` (default `.`), `DB_PATH`, `USER_ID`, `MEMORIES_PREFIX` (default `/memories/`),
    /// `MAX_FILE_SIZE_MB` (default 10). A non-numeric `MAX_FILE_SIZE_MB` is an error.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        if let Ok(root) = std::env::var("ROOT_DIR") {
            config.root_dir = PathBuf::from(root);
        }
        config.db_path = std::env::var("DB_PATH").ok().filter(|s| !s.is_empty());
        config.user_id = std::env::var("USER_ID").ok().filter(|s| !s.is_empty());
        if let Ok(prefix) = std::env::var("MEMORIES_PREFIX") {
            config.memories_prefix = prefix;
        }
        if let Ok(raw) = std::env::var("MAX_FILE_SIZE_MB") {
            config.max_file_size_mb = raw.trim().parse().map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("MAX_FILE_SIZE_MB must be a whole number of megabytes, got '{}'", raw),
                )
            })?;
        }
        Ok(config)
    }

    /// Apply optional overrides from `RunOptions` to this config.
    ///
    /// Only set fields in `options` override.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(root) = &options.root_dir {
            self.root_dir = root.clone();
        }
        if options.db_path.is_some() {
            self.db_path = options.db_path.clone();
        }
        if options.user_id.is_some() {
            self.user_id = options.user_id.clone();
        }
        if let Some(prefix) = &options.memories_prefix {
            self.memories_prefix = prefix.clone();
        }
        if let Some(mb) = options.max_file_size_mb {
            self.max_file_size_mb = mb;
        }
        self.verbose = options.verbose;
    }

    /// Backend stack this config describes.
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            root_dir: self.root_dir.clone(),
            max_file_size_mb: self.max_file_size_mb,
            memories_prefix: self.memories_prefix.clone(),
            store: match &self.db_path {
                Some(path) => StoreConfig::Sqlite {
                    path: path.clone(),
                },
                None => StoreConfig::InMemory,
            },
            user_id: self.user_id.clone(),
        }
    }
}
