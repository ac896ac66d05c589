//! Optional overrides for a run (CLI flags or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options) and
//! [`run_with_options`](crate::run_with_options).

use std::path::PathBuf;

/// Optional overrides: root directory, DB path, user, memories prefix, size cap, verbosity.
///
/// All fields are optional; only set fields override the base config (from env).
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Override the filesystem backend root.
    pub root_dir: Option<PathBuf>,
    /// Override SQLite database path for the memories store.
    pub db_path: Option<String>,
    /// User id scoping the memories namespace.
    pub user_id: Option<String>,
    /// Mount prefix for the memories store.
    pub memories_prefix: Option<String>,
    /// Files above this size (MB) are skipped by grep.
    pub max_file_size_mb: Option<u64>,
    /// Show debug logs.
    pub verbose: bool,
}
