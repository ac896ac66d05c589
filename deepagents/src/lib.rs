//! # deepagents: file backends for LLM agents
//!
//! Gives an agent a virtual filesystem it can `ls`, read, write, edit, glob and grep, with
//! the storage behind it chosen per path: ephemeral conversation state, a persistent store
//! scoped to the user, or a sandboxed directory on disk.
//!
//! ## Main Modules
//!
//! - [`backends`]: the [`Backend`] trait, `StateBackend`, `StoreBackend`, `FilesystemBackend`,
//!   `CompositeBackend`, and the shared formatting helpers in `backends::utils`.
//! - [`memory`]: `Store` trait with `InMemoryStore` and optional `SqliteStore`; `RunnableConfig`.
//! - [`tool_source`]: `FilesystemToolSource` (backend as agent tools) and `EvictingToolSource`.
//! - [`error`]: `BackendError`, whose `Display` is the message an agent reads.
//!
//! ## Features
//!
//! - `sqlite` (default): persistent store backed by SQLite.
//! - `tracing` (default): structured logging via the `tracing` crate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use deepagents::{Backend, CompositeBackend, InMemoryStore, RunnableConfig, StateBackend, StoreBackend};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = Arc::new(InMemoryStore::new());
//! let memories: Arc<dyn Backend> =
//!     Arc::new(StoreBackend::from_config(store, &RunnableConfig::for_user("u1")));
//! let fs = CompositeBackend::with_default(Arc::new(StateBackend::new()), [("/memories/", memories)]);
//!
//! fs.write("/memories/prefs.md", "dark mode").await.unwrap();
//! println!("{}", fs.read("/memories/prefs.md", 0, 100).await.unwrap());
//! # }
//! ```

pub mod backends;
pub mod error;
pub mod logging;
pub mod memory;
pub mod tool_source;

pub use backends::{
    Backend, CompositeBackend, EditResult, FileData, FileInfo, Files, FilesystemBackend,
    GrepMatch, GrepOutputMode, StateBackend, StoreBackend, WriteResult,
};
pub use error::{BackendError, BackendResult};
pub use memory::{InMemoryStore, Namespace, RunnableConfig, Store, StoreError};
#[cfg(feature = "sqlite")]
pub use memory::SqliteStore;
pub use tool_source::{
    EvictingToolSource, FilesystemToolSource, ToolCallContent, ToolCallContext, ToolSource,
    ToolSourceError, ToolSpec,
};
