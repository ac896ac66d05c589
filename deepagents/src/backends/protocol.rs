//! Backend protocol: the capability set every file backend implements, plus the record shapes
//! it exchanges (`FileData`, `FileInfo`, `GrepMatch`, `WriteResult`, `EditResult`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backends::utils::{format_glob_results, format_grep_matches, format_ls_results};
use crate::error::BackendResult;

/// One file: content as lines plus timestamps.
///
/// `content` joined with `\n` reconstructs the file; an empty file is an empty vec.
/// `created_at` is set once; `modified_at` moves on every content change and is never
/// earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    pub content: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Path → file mapping owned by one backend. Keys are absolute, normalized file paths.
pub type Files = BTreeMap<String, FileData>;

/// Listing projection of a file or inferred directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Absolute path; directories end with `/`.
    pub path: String,
    pub is_dir: bool,
    /// Content length: characters for in-memory backends, bytes on disk, 0 for directories.
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

impl FileInfo {
    /// Directory entry with no size or timestamp.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            size: 0,
            modified_at: None,
        }
    }
}

/// A single matching line from grep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrepMatch {
    pub path: String,
    /// 1-based line number.
    pub line: usize,
    pub text: String,
}

/// How grep renders its matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrepOutputMode {
    /// Sorted file paths only.
    #[default]
    FilesWithMatches,
    /// `path:` followed by indented `line: text` entries.
    Content,
    /// `path: N` per file.
    Count,
}

impl GrepOutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrepOutputMode::FilesWithMatches => "files_with_matches",
            GrepOutputMode::Content => "content",
            GrepOutputMode::Count => "count",
        }
    }
}

impl fmt::Display for GrepOutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrepOutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "files_with_matches" => Ok(GrepOutputMode::FilesWithMatches),
            "content" => Ok(GrepOutputMode::Content),
            "count" => Ok(GrepOutputMode::Count),
            other => Err(format!(
                "unknown output_mode '{}' (expected files_with_matches, content or count)",
                other
            )),
        }
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub path: String,
    /// Changed entries, for backends whose host runtime owns the namespace (state backend).
    pub files_update: Option<Files>,
}

/// Outcome of a successful edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    pub path: String,
    /// Number of occurrences replaced.
    pub occurrences: usize,
    pub files_update: Option<Files>,
}

/// File storage strategy behind the agent's file tools.
///
/// Implemented by [`StateBackend`](super::StateBackend), [`StoreBackend`](super::StoreBackend),
/// [`FilesystemBackend`](super::FilesystemBackend) and [`CompositeBackend`](super::CompositeBackend),
/// so callers hold `Arc<dyn Backend>` without knowing where files live.
///
/// Required methods return structured results; `ls`, `glob` and `grep` are provided on top of
/// them and render text that is identical in shape whichever backend served it. Read-type
/// operations never mutate storage; `write`/`edit` refresh `modified_at` and keep `created_at`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Immediate children of `path`: files plus inferred subdirectories, sorted by path.
    async fn ls_info(&self, path: &str) -> BackendResult<Vec<FileInfo>>;

    /// Line-numbered content of `[offset, offset + limit)` (0-based offset).
    async fn read(&self, file_path: &str, offset: usize, limit: usize) -> BackendResult<String>;

    /// Creates a new file; fails if the path already exists.
    async fn write(&self, file_path: &str, content: &str) -> BackendResult<WriteResult>;

    /// Replaces `old_string` with `new_string`; see
    /// [`perform_string_replacement`](super::utils::perform_string_replacement).
    async fn edit(
        &self,
        file_path: &str,
        old_string: &str,
        new_string: &str,
        replace_all: bool,
    ) -> BackendResult<EditResult>;

    /// Files under `path` whose relative path matches `pattern`, newest first.
    async fn glob_info(&self, pattern: &str, path: &str) -> BackendResult<Vec<FileInfo>>;

    /// Raw matching lines under `path` (default `/`), optionally filtered by a basename glob.
    async fn grep_raw(
        &self,
        pattern: &str,
        path: Option<&str>,
        glob: Option<&str>,
    ) -> BackendResult<Vec<GrepMatch>>;

    /// Listing rendered one path per line.
    async fn ls(&self, path: &str) -> BackendResult<String> {
        let infos = self.ls_info(path).await?;
        Ok(format_ls_results(&infos))
    }

    /// Glob matches rendered one path per line, or the "No files found" sentinel.
    async fn glob(&self, pattern: &str, path: &str) -> BackendResult<String> {
        let infos = self.glob_info(pattern, path).await?;
        Ok(format_glob_results(&infos))
    }

    /// Grep matches rendered per `output_mode`, or the "No matches found" sentinel.
    async fn grep(
        &self,
        pattern: &str,
        path: Option<&str>,
        glob: Option<&str>,
        output_mode: GrepOutputMode,
    ) -> BackendResult<String> {
        let matches = self.grep_raw(pattern, path, glob).await?;
        Ok(format_grep_matches(&matches, output_mode))
    }
}
