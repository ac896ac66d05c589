//! Tool source abstraction: the agent-facing side of the file backends.
//!
//! A [`ToolSource`] lists tool specs (name, description, JSON schema) and executes calls by
//! name with JSON arguments. [`FilesystemToolSource`] exposes a [`Backend`](crate::backends::Backend)
//! as `ls` / `read_file` / `write_file` / `edit_file` / `glob` / `grep`; [`EvictingToolSource`]
//! wraps any source and moves oversized results into the backend.
//!
//! Backend failures are tool output (text the agent reads), not `ToolSourceError`. The error
//! type is for dispatch problems only: unknown tool name or missing arguments.

mod context;
mod eviction;
mod filesystem_tool_source;

pub use context::ToolCallContext;
pub use eviction::{EvictingToolSource, LARGE_TOOL_RESULTS_DIR};
pub use filesystem_tool_source::{
    FilesystemToolSource, TOOL_EDIT_FILE, TOOL_GLOB, TOOL_GREP, TOOL_LS, TOOL_READ_FILE,
    TOOL_WRITE_FILE,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tool description handed to the model: name, optional description, JSON schema of arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Result of one tool call: the text fed back to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

/// Dispatch-level tool errors.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Source of tools: list specs, call by name.
///
/// `call_tool_with_context` and `set_call_context` default to ignoring the context; sources
/// that need the current tool-call id (e.g. [`EvictingToolSource`]) override them.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError>;

    async fn call_tool_with_context(
        &self,
        name: &str,
        arguments: Value,
        _ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.call_tool(name, arguments).await
    }

    fn set_call_context(&self, _ctx: Option<ToolCallContext>) {}
}
