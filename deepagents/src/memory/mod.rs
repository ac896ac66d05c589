//! # Memory: long-term Store
//!
//! Cross-session key-value storage used by the store-backed file backend. Entries are isolated
//! by [`Namespace`] (e.g. `["filesystem", user_id]`).
//!
//! ## Store Implementations
//!
//! | Type              | Persistence | Search                    | Feature  |
//! |-------------------|-------------|---------------------------|----------|
//! | [`InMemoryStore`] | In-memory   | String filter (key/value) | -        |
//! | [`SqliteStore`]   | SQLite file | String filter (key/value) | `sqlite` |
//!
//! [`RunnableConfig`] carries the caller identity that scopes a namespace.

mod config;
mod in_memory_store;
mod store;

#[cfg(feature = "sqlite")]
mod sqlite_store;

pub use config::RunnableConfig;
pub use in_memory_store::InMemoryStore;
pub use store::{Namespace, Store, StoreError, StoreSearchHit};

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;
