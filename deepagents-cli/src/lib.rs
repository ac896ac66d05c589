//! deepagents-cli library: run one file tool call against a configured backend stack.
//!
//! Reads config from env / .env, mounts the filesystem at `/` and a store at `/memories/`,
//! and returns the text an agent would receive from the tool.
//!
//! ## Usage
//!
//! ```rust,no_run,ignore
//! let call = ToolCall::from(&FsCommand::Ls { path: "/".into() });
//! let text = deepagents_cli::run(&call).await?;
//! ```

mod command;
mod config;
mod run;

pub use command::{FsCommand, ToolCall};
pub use config::{BackendConfig, Error, RunConfig, RunOptions, StoreConfig};
pub use run::{build_backend, run, run_with_config, run_with_options};

#[cfg(test)]
mod tests;
