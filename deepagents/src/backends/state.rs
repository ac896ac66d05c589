//! State-backed backend: files live in the conversation state the agent runtime threads
//! through each step.
//!
//! The backend never mutates the namespace in place. It reads a snapshot through
//! [`FilesState::files`] and hands changed entries to [`FilesState::apply`]; the same entries are
//! returned in `files_update` so a runtime with immutable state can fold them in itself.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::backends::protocol::{Backend, EditResult, FileData, FileInfo, Files, GrepMatch, WriteResult};
use crate::backends::utils::{
    create_file_data, file_data_to_string, format_read_response, glob_search_files,
    grep_matches_from_files, ls_info_from_files, normalize_file_path, perform_string_replacement,
    update_file_data,
};
use crate::error::{BackendError, BackendResult};

/// Access to the session's file namespace, owned by the host runtime.
pub trait FilesState: Send + Sync {
    /// Current namespace.
    fn files(&self) -> Files;

    /// Merges `update` into the namespace (entries replace same-path entries).
    fn apply(&self, update: &Files);

    /// One file, if present.
    fn get(&self, path: &str) -> Option<FileData> {
        self.files().get(path).cloned()
    }
}

/// Session-local namespace: a lock around a [`Files`] map.
///
/// **Interaction**: Default [`FilesState`] for [`StateBackend::new`]; one instance per session,
/// never shared between sessions.
#[derive(Debug, Default)]
pub struct SessionFiles {
    files: RwLock<Files>,
}

impl SessionFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing namespace (e.g. restored from a checkpoint).
    pub fn with_files(files: Files) -> Self {
        Self {
            files: RwLock::new(files),
        }
    }
}

impl FilesState for SessionFiles {
    fn files(&self) -> Files {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn apply(&self, update: &Files) {
        let mut guard = self.files.write().unwrap_or_else(PoisonError::into_inner);
        guard.extend(update.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    fn get(&self, path: &str) -> Option<FileData> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

/// Backend over the conversation state's `files` namespace.
pub struct StateBackend {
    state: Arc<dyn FilesState>,
}

impl StateBackend {
    /// Backend with a fresh session-local namespace.
    pub fn new() -> Self {
        Self::with_state(Arc::new(SessionFiles::new()))
    }

    /// Backend over a runtime-provided namespace.
    pub fn with_state(state: Arc<dyn FilesState>) -> Self {
        Self { state }
    }

    /// Snapshot of the namespace.
    pub fn files(&self) -> Files {
        self.state.files()
    }

    fn commit(&self, path: &str, data: FileData) -> Files {
        let mut update = Files::new();
        update.insert(path.to_string(), data);
        self.state.apply(&update);
        update
    }
}

impl Default for StateBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for StateBackend {
    async fn ls_info(&self, path: &str) -> BackendResult<Vec<FileInfo>> {
        ls_info_from_files(&self.state.files(), path)
    }

    async fn read(&self, file_path: &str, offset: usize, limit: usize) -> BackendResult<String> {
        let key = normalize_file_path(file_path)?;
        let data = self
            .state
            .get(&key)
            .ok_or_else(|| BackendError::FileNotFound(file_path.to_string()))?;
        format_read_response(&data, offset, limit)
    }

    async fn write(&self, file_path: &str, content: &str) -> BackendResult<WriteResult> {
        let key = normalize_file_path(file_path)?;
        if self.state.get(&key).is_some() {
            return Err(BackendError::AlreadyExists(file_path.to_string()));
        }
        let update = self.commit(&key, create_file_data(content));
        Ok(WriteResult {
            path: key,
            files_update: Some(update),
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
            .state
            .get(&key)
            .ok_or_else(|| BackendError::FileNotFound(file_path.to_string()))?;
        let (new_content, occurrences) = perform_string_replacement(
            &file_data_to_string(&data),
            old_string,
            new_string,
            replace_all,
        )?;
        let update = self.commit(&key, update_file_data(&data, &new_content));
        Ok(EditResult {
            path: key,
            occurrences,
            files_update: Some(update),
        })
    }

    async fn glob_info(&self, pattern: &str, path: &str) -> BackendResult<Vec<FileInfo>> {
        glob_search_files(&self.state.files(), pattern, path)
    }

    async fn grep_raw(
        &self,
        pattern: &str,
        path: Option<&str>,
        glob: Option<&str>,
    ) -> BackendResult<Vec<GrepMatch>> {
        grep_matches_from_files(&self.state.files(), pattern, path, glob)
    }
}
