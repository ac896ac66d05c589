//! Filesystem-backed backend: the namespace is a real directory tree under a root.
//!
//! Virtual paths (`/src/main.rs`) map onto `root/src/main.rs`. `..` components and a leading
//! `~` are rejected and the deepest existing ancestor of every resolved path must canonicalize to a
//! location under the root, so neither traversal nor symlinks escape it.

use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::backends::protocol::{Backend, EditResult, FileData, FileInfo, GrepMatch, WriteResult};
use crate::backends::utils::{
    basename, compile_glob, compile_regex, format_read_response, grep_lines, lines_of,
    perform_string_replacement, relative_to, sort_by_modified_desc, system_time_to_utc,
    validate_path,
};
use crate::error::{BackendError, BackendResult};

/// Default size above which grep skips a file, in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;

/// Backend over a directory on disk.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: PathBuf,
    max_file_size: u64,
}

impl FilesystemBackend {
    /// Backend rooted at `root`. The root is canonicalized once so later prefix checks compare
    /// like with like (e.g. macOS `/tmp` → `/private/tmp`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self {
            root,
            max_file_size: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
        }
    }

    /// Files larger than this are skipped by grep.
    pub fn with_max_file_size_mb(mut self, mb: u64) -> Self {
        self.max_file_size = mb * 1024 * 1024;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a virtual path to a real path under the root.
    fn resolve(&self, virtual_path: &str) -> BackendResult<PathBuf> {
        if virtual_path.starts_with('~') {
            return Err(BackendError::PathEscapesRoot(virtual_path.to_string()));
        }
        let relative = virtual_path.trim_start_matches('/');
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(BackendError::PathEscapesRoot(virtual_path.to_string())),
            }
        }
        let full = self.root.join(relative);

        let mut ancestor = full.as_path();
        while !ancestor.exists() {
            match ancestor.parent() {
                Some(parent) => ancestor = parent,
                None => break,
            }
        }
        let canonical_root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        if let Ok(canonical) = ancestor.canonicalize() {
            if !canonical.starts_with(&canonical_root) {
                return Err(BackendError::PathEscapesRoot(format!(
                    "{} is not under {}",
                    canonical.display(),
                    canonical_root.display()
                )));
            }
        }
        Ok(full)
    }

    /// Virtual path (`/a/b`) of a real path under the root.
    fn to_virtual(root: &Path, real: &Path) -> String {
        let rel = real.strip_prefix(root).unwrap_or(real);
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("/{}", parts.join("/"))
    }

    fn modified(meta: &std::fs::Metadata) -> DateTime<Utc> {
        system_time_to_utc(meta.modified().unwrap_or(SystemTime::UNIX_EPOCH))
    }

    fn file_data_from_disk(content: &str, meta: &std::fs::Metadata) -> FileData {
        let modified_at = Self::modified(meta);
        let created_at = meta
            .created()
            .map(system_time_to_utc)
            .unwrap_or(modified_at)
            .min(modified_at);
        FileData {
            content: lines_of(content),
            created_at,
            modified_at,
        }
    }

    fn file_info(root: &Path, real: &Path, meta: &std::fs::Metadata) -> FileInfo {
        FileInfo {
            path: Self::to_virtual(root, real),
            is_dir: false,
            size: meta.len(),
            modified_at: Some(Self::modified(meta)),
        }
    }

    async fn read_existing(&self, file_path: &str) -> BackendResult<(PathBuf, String, std::fs::Metadata)> {
        let real = self.resolve(file_path)?;
        let meta = match tokio::fs::metadata(&real).await {
            Ok(m) if m.is_file() => m,
            _ => return Err(BackendError::FileNotFound(file_path.to_string())),
        };
        let content = tokio::fs::read_to_string(&real).await?;
        Ok((real, content, meta))
    }

    /// Regular files under `dir`, not following symlinks.
    fn walk_files(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
        WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
    }
}

fn join_error(e: tokio::task::JoinError) -> BackendError {
    BackendError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

#[async_trait]
impl Backend for FilesystemBackend {
    async fn ls_info(&self, path: &str) -> BackendResult<Vec<FileInfo>> {
        let base = validate_path(Some(path))?;
        let dir = self.resolve(&base)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut infos = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(m) => m,
                Err(_) => continue,
            };
            let real = entry.path();
            if meta.is_dir() {
                infos.push(FileInfo::dir(format!(
                    "{}/",
                    Self::to_virtual(&self.root, &real)
                )));
            } else if meta.is_file() {
                infos.push(Self::file_info(&self.root, &real, &meta));
            }
        }
        infos.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(infos)
    }

    async fn read(&self, file_path: &str, offset: usize, limit: usize) -> BackendResult<String> {
        let (_, content, meta) = self.read_existing(file_path).await?;
        format_read_response(&Self::file_data_from_disk(&content, &meta), offset, limit)
    }

    async fn write(&self, file_path: &str, content: &str) -> BackendResult<WriteResult> {
        let real = self.resolve(file_path)?;
        if tokio::fs::try_exists(&real).await? {
            return Err(BackendError::AlreadyExists(file_path.to_string()));
        }
        if let Some(parent) = real.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&real, content).await?;
        Ok(WriteResult {
            path: Self::to_virtual(&self.root, &real),
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
        let (real, content, _) = self.read_existing(file_path).await?;
        let (new_content, occurrences) =
            perform_string_replacement(&content, old_string, new_string, replace_all)?;
        tokio::fs::write(&real, new_content).await?;
        Ok(EditResult {
            path: Self::to_virtual(&self.root, &real),
            occurrences,
            files_update: None,
        })
    }

    async fn glob_info(&self, pattern: &str, path: &str) -> BackendResult<Vec<FileInfo>> {
        let matcher = compile_glob(pattern)?;
        let Ok(base) = validate_path(Some(path)) else {
            return Ok(Vec::new());
        };
        let dir = self.resolve(&base)?;
        let root = self.root.clone();
        let mut infos = tokio::task::spawn_blocking(move || {
            Self::walk_files(&dir)
                .filter_map(|entry| {
                    let virtual_path = Self::to_virtual(&root, entry.path());
                    let rel = relative_to(&virtual_path, &base)?;
                    if !matcher.is_match(rel) {
                        return None;
                    }
                    let meta = entry.metadata().ok()?;
                    Some(Self::file_info(&root, entry.path(), &meta))
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(join_error)?;
        sort_by_modified_desc(&mut infos);
        Ok(infos)
    }

    async fn grep_raw(
        &self,
        pattern: &str,
        path: Option<&str>,
        glob: Option<&str>,
    ) -> BackendResult<Vec<GrepMatch>> {
        let regex = compile_regex(pattern)?;
        let glob = glob.map(compile_glob).transpose()?;
        let Ok(base) = validate_path(path) else {
            return Ok(Vec::new());
        };
        let dir = self.resolve(&base)?;
        let root = self.root.clone();
        let max_file_size = self.max_file_size;
        let mut matches = tokio::task::spawn_blocking(move || {
            let mut matches = Vec::new();
            for entry in Self::walk_files(&dir) {
                let virtual_path = Self::to_virtual(&root, entry.path());
                if let Some(g) = &glob {
                    if !g.is_match(basename(&virtual_path)) {
                        continue;
                    }
                }
                if entry.metadata().map(|m| m.len() > max_file_size).unwrap_or(true) {
                    continue;
                }
                // Binary and non-UTF-8 files are skipped.
                let Ok(content) = std::fs::read_to_string(entry.path()) else {
                    continue;
                };
                let lines = lines_of(&content);
                matches.extend(grep_lines(
                    &virtual_path,
                    lines.iter().map(String::as_str),
                    &regex,
                ));
            }
            matches
        })
        .await
        .map_err(join_error)?;
        matches.sort_by(|a, b| a.path.cmp(&b.path).then(a.line.cmp(&b.line)));
        Ok(matches)
    }
}
