//! Composite backend: one namespace federated over several mounted backends.
//!
//! Mounts are `(prefix, backend)` pairs. Prefixes are normalized to `/name/` and matched
//! longest first, so `/a/b/` wins over `/a/` for `/a/b/x`. The routed backend sees the path
//! with the prefix stripped (`/memories/notes.md` → `/notes.md`); paths it returns are
//! re-prefixed before the caller sees them. Paths under no mount go to the default backend,
//! or fail with [`BackendError::NoMount`] when there is none.
//!
//! `glob` and `grep` span every backend whose namespace intersects the search base. One
//! failing mount is logged and left out of the merged result; invalid patterns are rejected
//! before any backend is called.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use crate::backends::protocol::{Backend, EditResult, FileInfo, Files, GrepMatch, WriteResult};
use crate::backends::utils::{
    compile_glob, compile_regex, relative_to, sort_by_modified_desc, validate_path,
};
use crate::error::{BackendError, BackendResult};
use crate::logging::{log_mount_skipped, log_route};

/// A resolved call target: backend, the mount prefix it lives under, and the key it sees.
struct Route<'a> {
    backend: &'a Arc<dyn Backend>,
    /// `None` for the default backend.
    prefix: Option<&'a str>,
    key: String,
    /// Mount nested below a search base, queried at its own root.
    nested: bool,
}

impl Route<'_> {
    /// Maps a path returned by the backend back into the composite namespace.
    fn restore(&self, path: &str) -> String {
        match self.prefix {
            Some(prefix) => format!("{}{}", prefix.trim_end_matches('/'), path),
            None => path.to_string(),
        }
    }

    fn restore_info(&self, mut info: FileInfo) -> FileInfo {
        info.path = self.restore(&info.path);
        info
    }

    fn restore_match(&self, mut m: GrepMatch) -> GrepMatch {
        m.path = self.restore(&m.path);
        m
    }

    fn restore_files(&self, files: Option<Files>) -> Option<Files> {
        files.map(|files| {
            files
                .into_iter()
                .map(|(path, data)| (self.restore(&path), data))
                .collect()
        })
    }
}

/// Backend that routes by longest matching path prefix.
///
/// **Interaction**: Wraps any mix of [`StateBackend`](super::StateBackend),
/// [`StoreBackend`](super::StoreBackend) and [`FilesystemBackend`](super::FilesystemBackend);
/// is itself a [`Backend`], so tool sources do not know the namespace is federated. The mount
/// table is fixed at construction.
pub struct CompositeBackend {
    default: Option<Arc<dyn Backend>>,
    /// Sorted by prefix length, longest first.
    mounts: Vec<(String, Arc<dyn Backend>)>,
}

impl CompositeBackend {
    /// Router over `mounts` only; paths under no mount are errors.
    pub fn new<P>(mounts: impl IntoIterator<Item = (P, Arc<dyn Backend>)>) -> Self
    where
        P: AsRef<str>,
    {
        let mut mounts: Vec<(String, Arc<dyn Backend>)> = mounts
            .into_iter()
            .map(|(prefix, backend)| (Self::normalize_prefix(prefix.as_ref()), backend))
            .collect();
        mounts.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        mounts.dedup_by(|later, earlier| later.0 == earlier.0);
        Self {
            default: None,
            mounts,
        }
    }

    /// Router that sends paths under no mount to `default`.
    pub fn with_default<P>(
        default: Arc<dyn Backend>,
        mounts: impl IntoIterator<Item = (P, Arc<dyn Backend>)>,
    ) -> Self
    where
        P: AsRef<str>,
    {
        let mut router = Self::new(mounts);
        router.default = Some(default);
        router
    }

    /// Mount prefixes, longest first.
    pub fn mount_prefixes(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|(prefix, _)| prefix.as_str())
    }

    /// `memories` / `/memories` / `/memories/` → `/memories/`.
    fn normalize_prefix(prefix: &str) -> String {
        let trimmed = prefix.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }

    /// Longest mount covering `path`, else the default backend.
    fn route(&self, path: &str) -> BackendResult<Route<'_>> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        for (prefix, backend) in &self.mounts {
            if let Some(rest) = path.strip_prefix(prefix.as_str()) {
                return Ok(Route {
                    backend,
                    prefix: Some(prefix.as_str()),
                    key: format!("/{}", rest),
                    nested: false,
                });
            }
            // The mount root named without its trailing slash, e.g. `/memories`.
            if prefix.len() == path.len() + 1 && prefix.starts_with(&path) {
                return Ok(Route {
                    backend,
                    prefix: Some(prefix.as_str()),
                    key: "/".to_string(),
                    nested: false,
                });
            }
        }
        match &self.default {
            Some(backend) => Ok(Route {
                backend,
                prefix: None,
                key: path,
                nested: false,
            }),
            None => Err(BackendError::NoMount(path)),
        }
    }

    /// Prefix of the mount that owns `path` (`None` = default backend).
    fn owner(&self, path: &str) -> Option<&str> {
        self.mounts
            .iter()
            .map(|(prefix, _)| prefix.as_str())
            .find(|prefix| path.starts_with(prefix))
    }

    /// Every backend whose namespace intersects the directory `base`: the one covering it
    /// (if any) plus mounts nested strictly below it, each queried at its own root.
    fn targets(&self, base: &str) -> BackendResult<Vec<Route<'_>>> {
        let covering = match self.route(base) {
            Ok(route) => Some(route),
            Err(BackendError::NoMount(_)) => None,
            Err(e) => return Err(e),
        };
        let covering_prefix = covering.as_ref().and_then(|r| r.prefix);
        let mut targets: Vec<Route<'_>> = covering.into_iter().collect();
        targets.extend(
            self.mounts
                .iter()
                .filter(|(prefix, _)| {
                    prefix.starts_with(base) && Some(prefix.as_str()) != covering_prefix
                })
                .map(|(prefix, backend)| Route {
                    backend,
                    prefix: Some(prefix.as_str()),
                    key: "/".to_string(),
                    nested: true,
                }),
        );
        if targets.is_empty() {
            return Err(BackendError::NoMount(base.to_string()));
        }
        Ok(targets)
    }

    /// Directory entries for mounts nested below `base` (`/a/b/` under `/` shows as `/a/`).
    fn mount_dirs_under(&self, base: &str) -> BTreeSet<String> {
        self.mounts
            .iter()
            .filter_map(|(prefix, _)| {
                let rest = prefix.strip_prefix(base)?;
                let first = rest.split('/').next().filter(|s| !s.is_empty())?;
                Some(format!("{}{}/", base, first))
            })
            .collect()
    }

    /// Runs `call` on every target and maps results back into the composite namespace with
    /// `restore`. A single target propagates its error; with several, failed targets are logged
    /// and skipped. Results a target returns for paths shadowed by a deeper mount are dropped.
    async fn fan_out<'a, T, F, Fut>(
        &'a self,
        operation: &str,
        targets: Vec<Route<'a>>,
        call: F,
        restore: impl Fn(&Route<'a>, T) -> T,
        path_of: impl Fn(&T) -> &str,
    ) -> BackendResult<Vec<T>>
    where
        F: Fn(&'a Arc<dyn Backend>, String, bool) -> Fut,
        Fut: std::future::Future<Output = BackendResult<Vec<T>>>,
    {
        let single = targets.len() == 1;
        let results =
            join_all(targets.iter().map(|t| call(t.backend, t.key.clone(), t.nested))).await;
        let mut merged = Vec::new();
        for (target, result) in targets.iter().zip(results) {
            match result {
                Ok(items) => merged.extend(
                    items
                        .into_iter()
                        .map(|item| restore(target, item))
                        .filter(|item| self.owner(path_of(item)) == target.prefix),
                ),
                Err(e) if single => return Err(e),
                Err(e) => log_mount_skipped(operation, target.prefix, &e),
            }
        }
        Ok(merged)
    }
}

#[async_trait]
impl Backend for CompositeBackend {
    async fn ls_info(&self, path: &str) -> BackendResult<Vec<FileInfo>> {
        let base = validate_path(Some(path))?;
        let mount_dirs = self.mount_dirs_under(&base);
        let mut infos = match self.route(&base) {
            Ok(route) => {
                log_route("ls", &base, route.prefix);
                route
                    .backend
                    .ls_info(&route.key)
                    .await?
                    .into_iter()
                    .map(|info| route.restore_info(info))
                    .collect()
            }
            Err(BackendError::NoMount(_)) if !mount_dirs.is_empty() => Vec::new(),
            Err(e) => return Err(e),
        };
        for dir in mount_dirs {
            if !infos.iter().any(|info| info.path == dir) {
                infos.push(FileInfo::dir(dir));
            }
        }
        infos.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(infos)
    }

    async fn read(&self, file_path: &str, offset: usize, limit: usize) -> BackendResult<String> {
        let route = self.route(file_path)?;
        log_route("read", file_path, route.prefix);
        route.backend.read(&route.key, offset, limit).await
    }

    async fn write(&self, file_path: &str, content: &str) -> BackendResult<WriteResult> {
        let route = self.route(file_path)?;
        log_route("write", file_path, route.prefix);
        let res = route.backend.write(&route.key, content).await?;
        Ok(WriteResult {
            path: route.restore(&res.path),
            files_update: route.restore_files(res.files_update),
        })
    }

    async fn edit(
        &self,
        file_path: &str,
        old_string: &str,
        new_string: &str,
        replace_all: bool,
    ) -> BackendResult<EditResult> {
        let route = self.route(file_path)?;
        log_route("edit", file_path, route.prefix);
        let res = route
            .backend
            .edit(&route.key, old_string, new_string, replace_all)
            .await?;
        Ok(EditResult {
            path: route.restore(&res.path),
            occurrences: res.occurrences,
            files_update: route.restore_files(res.files_update),
        })
    }

    async fn glob_info(&self, pattern: &str, path: &str) -> BackendResult<Vec<FileInfo>> {
        let matcher = compile_glob(pattern)?;
        let base = validate_path(Some(path))?;
        let targets = self.targets(&base)?;
        let mut infos = self
            .fan_out(
                "glob",
                targets,
                |backend, key, nested| async move {
                    // A nested mount returns everything; `matcher` filters relative to `base`.
                    let query = if nested { "**" } else { pattern };
                    backend.glob_info(query, &key).await
                },
                |route, info| route.restore_info(info),
                |info: &FileInfo| info.path.as_str(),
            )
            .await?;
        infos.retain(|info| relative_to(&info.path, &base).is_some_and(|rel| matcher.is_match(rel)));
        sort_by_modified_desc(&mut infos);
        Ok(infos)
    }

    async fn grep_raw(
        &self,
        pattern: &str,
        path: Option<&str>,
        glob: Option<&str>,
    ) -> BackendResult<Vec<GrepMatch>> {
        compile_regex(pattern)?;
        if let Some(g) = glob {
            compile_glob(g)?;
        }
        let base = validate_path(path)?;
        let targets = self.targets(&base)?;
        let mut matches = self
            .fan_out(
                "grep",
                targets,
                |backend, key, _nested| async move {
                    backend.grep_raw(pattern, Some(&key), glob).await
                },
                |route, m| route.restore_match(m),
                |m: &GrepMatch| m.path.as_str(),
            )
            .await?;
        matches.sort_by(|a, b| a.path.cmp(&b.path).then(a.line.cmp(&b.line)));
        Ok(matches)
    }
}
