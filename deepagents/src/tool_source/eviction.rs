//! Large tool result eviction.
//!
//! A tool result bigger than the result budget is written to
//! `/large_tool_results/{tool_call_id}` on a backend and replaced by a short notice with the
//! first lines, so the model can page through it with `read_file` instead of carrying it in
//! context.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::backends::utils::{
    format_content_with_line_numbers, lines_of, sanitize_tool_call_id, TOOL_RESULT_CHAR_LIMIT,
};
use crate::backends::Backend;
use crate::logging::{log_backend_error, log_eviction};
use crate::tool_source::{
    ToolCallContent, ToolCallContext, ToolSource, ToolSourceError, ToolSpec, TOOL_READ_FILE,
};

/// Directory evicted results are written under.
pub const LARGE_TOOL_RESULTS_DIR: &str = "/large_tool_results";

/// Lines of the result kept inline in the notice.
const SAMPLE_LINES: usize = 10;

/// Tool source wrapper that moves oversized results into a backend.
///
/// Results are evicted only when a tool-call id is known (from the per-call context or the
/// one set via `set_call_context`); otherwise they pass through unchanged. `read_file` is
/// never evicted, so reading an evicted result back cannot evict it again.
///
/// **Interaction**: Wraps any [`ToolSource`], typically a
/// [`FilesystemToolSource`](super::FilesystemToolSource) over the same backend it evicts to.
pub struct EvictingToolSource<S> {
    inner: S,
    backend: Arc<dyn Backend>,
    char_limit: usize,
    excluded: HashSet<String>,
    context: RwLock<Option<ToolCallContext>>,
}

impl<S: ToolSource> EvictingToolSource<S> {
    pub fn new(inner: S, backend: Arc<dyn Backend>) -> Self {
        Self {
            inner,
            backend,
            char_limit: TOOL_RESULT_CHAR_LIMIT,
            excluded: HashSet::from([TOOL_READ_FILE.to_string()]),
            context: RwLock::new(None),
        }
    }

    /// Results longer than `chars` are evicted.
    pub fn with_char_limit(mut self, chars: usize) -> Self {
        self.char_limit = chars;
        self
    }

    /// Tools whose results are never evicted (in addition to `read_file`).
    pub fn with_excluded<I, T>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.excluded.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Path an evicted result for `tool_call_id` is written to.
    pub fn eviction_path(tool_call_id: &str) -> String {
        format!(
            "{}/{}",
            LARGE_TOOL_RESULTS_DIR,
            sanitize_tool_call_id(tool_call_id)
        )
    }

    fn notice(tool_call_id: &str, path: &str, text: &str) -> String {
        let lines = lines_of(text);
        let sample = format_content_with_line_numbers(&lines[..lines.len().min(SAMPLE_LINES)], 1);
        format!(
            "Tool result too large, the result of this tool call {} was saved in the filesystem at this path: {}\n\
             You can read the result from the filesystem by using the read_file tool, but make sure to only read part of the result at a time.\n\
             You can do this by specifying an offset and limit in the read_file tool call.\n\
             For example, to read the first 100 lines, you can use the read_file tool with offset=0 and limit=100.\n\n\
             Here are the first {} lines of the result:\n{}",
            tool_call_id, path, SAMPLE_LINES, sample
        )
    }

    async fn maybe_evict(
        &self,
        name: &str,
        tool_call_id: Option<&str>,
        content: ToolCallContent,
    ) -> ToolCallContent {
        let Some(tool_call_id) = tool_call_id else {
            return content;
        };
        let chars = content.text.chars().count();
        if self.excluded.contains(name) || chars <= self.char_limit {
            return content;
        }
        let path = Self::eviction_path(tool_call_id);
        match self.backend.write(&path, &content.text).await {
            Ok(res) => {
                log_eviction(name, &res.path, chars);
                ToolCallContent {
                    text: Self::notice(tool_call_id, &res.path, &content.text),
                }
            }
            Err(e) => {
                log_backend_error(name, &e);
                content
            }
        }
    }
}

#[async_trait]
impl<S: ToolSource> ToolSource for EvictingToolSource<S> {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        self.inner.list_tools().await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        let ctx = self
            .context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.call_tool_with_context(name, arguments, ctx.as_ref()).await
    }

    async fn call_tool_with_context(
        &self,
        name: &str,
        arguments: Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let content = self.inner.call_tool_with_context(name, arguments, ctx).await?;
        let tool_call_id = ctx.and_then(|c| c.tool_call_id.as_deref());
        Ok(self.maybe_evict(name, tool_call_id, content).await)
    }

    fn set_call_context(&self, ctx: Option<ToolCallContext>) {
        *self.context.write().unwrap_or_else(PoisonError::into_inner) = ctx.clone();
        self.inner.set_call_context(ctx);
    }
}
