//! Unit tests for deepagents-cli, organized by module.
//!
//! Tests are BDD-style with clear Given/When/Then comments and descriptive names.
//! Each submodule documents the behaviour under test.

mod run;

use std::sync::Mutex;

/// Lock used by tests that set/remove process env vars so they run serially and do not race.
static ENV_LOCK: std::sync::OnceLock<Mutex<()>> = std::sync::OnceLock::new();

pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Env vars read by `RunConfig::from_env`.
pub(crate) const CONFIG_VARS: [&str; 5] = [
    "ROOT_DIR",
    "DB_PATH",
    "USER_ID",
    "MEMORIES_PREFIX",
    "MAX_FILE_SIZE_MB",
];

/// Runs `f` with `vars` set and every other config var removed, then restores the environment.
pub(crate) fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let _guard = env_lock();
    let saved: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|k| (*k, std::env::var(k).ok()))
        .collect();
    for k in CONFIG_VARS {
        std::env::remove_var(k);
    }
    for (k, v) in vars {
        std::env::set_var(k, v);
    }
    let out = f();
    for (k, v) in saved {
        match v {
            Some(v) => std::env::set_var(k, v),
            None => std::env::remove_var(k),
        }
    }
    out
}
