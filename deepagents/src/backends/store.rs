//! Store-backed backend: files persist in a [`Store`] under a caller-scoped namespace and
//! survive across sessions.
//!
//! Each file is one store entry: key = normalized path, value = JSON-encoded [`FileData`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::backends::protocol::{Backend, EditResult, FileData, FileInfo, Files, GrepMatch, WriteResult};
use crate::backends::utils::{
    create_file_data, file_data_to_string, format_read_response, glob_search_files,
    grep_matches_from_files, ls_info_from_files, normalize_file_path, perform_string_replacement,
    update_file_data,
};
use crate::error::{BackendError, BackendResult};
use crate::memory::{Namespace, RunnableConfig, Store};

/// Namespace kind for file entries.
pub const FILESYSTEM_NAMESPACE: &str = "filesystem";

/// Backend over a persistent key-value store.
///
/// **Interaction**: Holds `Arc<dyn Store>` ([`InMemoryStore`](crate::memory::InMemoryStore) or
/// [`SqliteStore`](crate::memory::SqliteStore)); usually mounted in a
/// [`CompositeBackend`](super::CompositeBackend) at `/memories/`.
pub struct StoreBackend {
    store: Arc<dyn Store>,
    namespace: Namespace,
}

impl StoreBackend {
    /// Backend over `store` with an explicit namespace.
    pub fn new(store: Arc<dyn Store>, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    /// Namespace `["filesystem", scope]` where scope is the config's user or assistant id.
    pub fn from_config(store: Arc<dyn Store>, config: &RunnableConfig) -> Self {
        let mut namespace = vec![FILESYSTEM_NAMESPACE.to_string()];
        if let Some(scope) = config.scope_id() {
            namespace.push(scope.to_string());
        }
        Self::new(store, namespace)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn decode(value: Value) -> BackendResult<FileData> {
        serde_json::from_value(value).map_err(|e| BackendError::Serialization(e.to_string()))
    }

    fn encode(data: &FileData) -> BackendResult<Value> {
        serde_json::to_value(data).map_err(|e| BackendError::Serialization(e.to_string()))
    }

    async fn get_file(&self, key: &str) -> BackendResult<Option<FileData>> {
        self.store
            .get(&self.namespace, key)
            .await?
            .map(Self::decode)
            .transpose()
    }

    async fn put_file(&self, key: &str, data: &FileData) -> BackendResult<()> {
        let value = Self::encode(data)?;
        self.store.put(&self.namespace, key, &value).await?;
        Ok(())
    }

    /// Materializes the whole namespace for listing and search.
    async fn load_files(&self) -> BackendResult<Files> {
        let hits = self.store.search(&self.namespace, None, None).await?;
        hits.into_iter()
            .map(|hit| Self::decode(hit.value).map(|data| (hit.key, data)))
            .collect()
    }
}

#[async_trait]
impl Backend for StoreBackend {
    async fn ls_info(&self, path: &str) -> BackendResult<Vec<FileInfo>> {
        ls_info_from_files(&self.load_files().await?, path)
    }

    async fn read(&self, file_path: &str, offset: usize, limit: usize) -> BackendResult<String> {
        let key = normalize_file_path(file_path)?;
        let data = self
            .get_file(&key)
            .await?
            .ok_or_else(|| BackendError::FileNotFound(file_path.to_string()))?;
        format_read_response(&data, offset, limit)
    }

    async fn write(&self, file_path: &str, content: &str) -> BackendResult<WriteResult> {
        let key = normalize_file_path(file_path)?;
        if self.get_file(&key).await?.is_some() {
            return Err(BackendError::AlreadyExists(file_path.to_string()));
        }
        self.put_file(&key, &create_file_data(content)).await?;
        Ok(WriteResult {
            path: key,
            files_update: None,
        })
    }

    async fn edit(
        &self,
        file_path: &str,
        old_string: &str,
        new_string: &str,
        replace_all: bool,
    ) -> BackendResult<EditResult> {
        let key = normalize_file_path(file_path)?;
        let data = self
            .get_file(&key)
            .await?
            .ok_or_else(|| BackendError::FileNotFound(file_path.to_string()))?;
        let (new_content, occurrences) = perform_string_replacement(
            &file_data_to_string(&data),
            old_string,
            new_string,
            replace_all,
        )?;
        self.put_file(&key, &update_file_data(&data, &new_content))
            .await?;
        Ok(EditResult {
            path: key,
            occurrences,
            files_update: None,
        })
    }

    async fn glob_info(&self, pattern: &str, path: &str) -> BackendResult<Vec<FileInfo>> {
        glob_search_files(&self.load_files().await?, pattern, path)
    }

    async fn grep_raw(
        &self,
        pattern: &str,
        path: Option<&str>,
        glob: Option<&str>,
    ) -> BackendResult<Vec<GrepMatch>> {
        grep_matches_from_files(&self.load_files().await?, pattern, path, glob)
    }
}
