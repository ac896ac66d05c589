//! # Backends: pluggable file storage for agent tools
//!
//! Every backend implements [`Backend`] over a flat, path-addressed namespace (`/dir/file.txt`;
//! directories are inferred from path prefixes).
//!
//! | Type                  | Storage                          | Lifetime          |
//! |-----------------------|----------------------------------|-------------------|
//! | [`StateBackend`]      | Conversation state ([`FilesState`]) | One session    |
//! | [`StoreBackend`]      | [`Store`](crate::memory::Store), namespaced per user | Across sessions |
//! | [`FilesystemBackend`] | A directory on disk              | Disk              |
//! | [`CompositeBackend`]  | Routes by path prefix to the above | -               |
//!
//! [`utils`] holds the shared formatting and search helpers, so output is identical in shape
//! whichever backend produced it.

mod composite;
mod filesystem;
mod protocol;
mod state;
mod store;
pub mod utils;

pub use composite::CompositeBackend;
pub use filesystem::{FilesystemBackend, DEFAULT_MAX_FILE_SIZE_MB};
pub use protocol::{
    Backend, EditResult, FileData, FileInfo, Files, GrepMatch, GrepOutputMode, WriteResult,
};
pub use state::{FilesState, SessionFiles, StateBackend};
pub use store::{StoreBackend, FILESYSTEM_NAMESPACE};
