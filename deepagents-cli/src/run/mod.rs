//! Run entry points: run with default config, run_with_config, or run_with_options.
//!
//! Each run assembles the backend stack from config, wraps it in a `FilesystemToolSource`
//! and executes one tool call, returning the text an agent would see.

pub use crate::config::Error;

mod store;

use std::sync::Arc;

use deepagents::{
    Backend, CompositeBackend, FilesystemBackend, FilesystemToolSource, RunnableConfig,
    StoreBackend, ToolSource,
};

use crate::command::ToolCall;
use crate::config::{BackendConfig, RunConfig, RunOptions};

/// Builds the composite: filesystem at `/`, store-backed memories at the configured prefix.
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn Backend>, Error> {
    let filesystem = FilesystemBackend::new(&config.root_dir)
        .with_max_file_size_mb(config.max_file_size_mb);
    let store = store::open_store(&config.store)?;
    let identity = RunnableConfig {
        user_id: config.user_id.clone(),
        ..RunnableConfig::default()
    };
    let memories: Arc<dyn Backend> = Arc::new(StoreBackend::from_config(store, &identity));
    Ok(Arc::new(CompositeBackend::with_default(
        Arc::new(filesystem),
        [(config.memories_prefix.as_str(), memories)],
    )))
}

/// Run one tool call with default config (from .env), returns the tool output.
///
/// Loads `.env` internally, then calls `run_with_config`.
pub async fn run(call: &ToolCall) -> Result<String, Error> {
    dotenv::dotenv().ok();
    let config = RunConfig::from_env()?;
    run_with_config(&config, call).await
}

/// Run with config from env and optional overrides (e.g. from CLI flags).
pub async fn run_with_options(call: &ToolCall, options: &RunOptions) -> Result<String, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    run_with_config(&config, call).await
}

/// Run one tool call against the stack described by `config`.
///
/// When `config.verbose` is true the backend stack summary is printed to stderr first.
/// Backend failures come back as `Ok` text (as the agent would see them); `Err` means the call
/// could not be dispatched or the stack could not be built.
pub async fn run_with_config(config: &RunConfig, call: &ToolCall) -> Result<String, Error> {
    let backend_config = config.backend_config();
    if config.verbose {
        eprintln!("backends: {}", backend_config);
    }
    tracing::debug!(stack = %backend_config, tool = %call.name, "Running tool call");
    let tools = FilesystemToolSource::new(build_backend(&backend_config)?);
    let content = tools.call_tool(&call.name, call.arguments.clone()).await?;
    Ok(content.text)
}
