//! Configuration types for running a file tool call.
//!
//! Re-exports [`BackendConfig`], [`RunConfig`], [`RunOptions`] and config [`Error`].

mod backend_config;
mod run_config;
mod run_options;

pub use backend_config::{BackendConfig, StoreConfig};
pub use run_config::{Error, RunConfig};
pub use run_options::RunOptions;
