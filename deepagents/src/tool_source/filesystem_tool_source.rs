//! Filesystem tool source: a backend as agent tools (ls, read_file, write_file, edit_file,
//! glob, grep).
//!
//! Every backend error becomes the tool's text output so the model can read it and retry.
//! Large `ls`/`glob` lists and large `read_file`/`grep` text are truncated with guidance.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backends::utils::{
    truncate_lines_if_too_long, truncate_text_if_too_long, DEFAULT_READ_LIMIT,
    DEFAULT_READ_OFFSET, NO_FILES_FOUND,
};
use crate::backends::{Backend, GrepOutputMode};
use crate::error::BackendError;
use crate::logging::log_backend_error;
use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Tool name: list a directory.
pub const TOOL_LS: &str = "ls";
/// Tool name: read a window of a file with line numbers.
pub const TOOL_READ_FILE: &str = "read_file";
/// Tool name: create a new file.
pub const TOOL_WRITE_FILE: &str = "write_file";
/// Tool name: exact string replacement in a file.
pub const TOOL_EDIT_FILE: &str = "edit_file";
/// Tool name: find files by glob pattern.
pub const TOOL_GLOB: &str = "glob";
/// Tool name: search file contents by regex.
pub const TOOL_GREP: &str = "grep";

fn ls_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_LS.to_string(),
        description: Some(
            "List the files and directories directly under a path. Directories end with '/'. \
             Use before read_file or edit_file to explore the filesystem."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Absolute directory path (default /)" }
            }
        }),
    }
}

fn read_file_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_READ_FILE.to_string(),
        description: Some(format!(
            "Read a file with line numbers (cat -n format). Reads up to {} lines from offset {} \
             by default; pass offset and limit to page through long files.",
            DEFAULT_READ_LIMIT, DEFAULT_READ_OFFSET
        )),
        input_schema: json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string", "description": "Absolute file path" },
                "offset": { "type": "integer", "description": "0-based line to start from (optional)" },
                "limit": { "type": "integer", "description": "Max lines to read (optional)" }
            },
            "required": ["file_path"]
        }),
    }
}

fn write_file_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_WRITE_FILE.to_string(),
        description: Some(
            "Create a new file with the given content. Fails if the file already exists; \
             use edit_file to change an existing file."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string", "description": "Absolute file path" },
                "content": { "type": "string", "description": "File content" }
            },
            "required": ["file_path", "content"]
        }),
    }
}

fn edit_file_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_EDIT_FILE.to_string(),
        description: Some(
            "Replace an exact string in a file. old_string must occur exactly once unless \
             replace_all is true. Read the file first."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string", "description": "Absolute file path" },
                "old_string": { "type": "string", "description": "Exact text to replace" },
                "new_string": { "type": "string", "description": "Replacement text" },
                "replace_all": { "type": "boolean", "description": "Replace every occurrence (default false)" }
            },
            "required": ["file_path", "old_string", "new_string"]
        }),
    }
}

fn glob_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_GLOB.to_string(),
        description: Some(
            "Find files matching a glob pattern (e.g. '*.py', '**/*.md', 'src/{a,b}.rs') under a \
             path. Results are sorted newest first."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "pattern": { "type": "string", "description": "Glob pattern" },
                "path": { "type": "string", "description": "Base directory (default /)" }
            },
            "required": ["pattern"]
        }),
    }
}

fn grep_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_GREP.to_string(),
        description: Some(
            "Search file contents with a regular expression. output_mode is one of \
             files_with_matches (default), content or count."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "pattern": { "type": "string", "description": "Regular expression" },
                "path": { "type": "string", "description": "Base directory (default /)" },
                "glob": { "type": "string", "description": "Only search files whose name matches (optional)" },
                "output_mode": {
                    "type": "string",
                    "enum": ["files_with_matches", "content", "count"],
                    "description": "Result format (optional)"
                }
            },
            "required": ["pattern"]
        }),
    }
}

fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, ToolSourceError> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("missing {}", key)))
}

fn optional_str<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(|v| v.as_str())
}

fn optional_usize(arguments: &Value, key: &str) -> Option<usize> {
    arguments.get(key).and_then(|v| v.as_u64()).map(|n| n as usize)
}

/// Splits a rendered list back into lines, truncates it, and joins it again.
fn truncate_listing(text: String) -> String {
    if text.is_empty() || text == NO_FILES_FOUND {
        return text;
    }
    truncate_lines_if_too_long(text.lines().map(String::from).collect()).join("\n")
}

/// Tool source exposing one [`Backend`] as file tools.
///
/// **Interaction**: Holds `Arc<dyn Backend>`, usually a
/// [`CompositeBackend`](crate::backends::CompositeBackend); wrap it in
/// [`EvictingToolSource`](super::EvictingToolSource) to keep huge results out of the context.
pub struct FilesystemToolSource {
    backend: Arc<dyn Backend>,
}

impl FilesystemToolSource {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Renders a backend outcome as tool output.
    fn respond(tool: &str, result: Result<String, BackendError>) -> ToolCallContent {
        let text = result.unwrap_or_else(|e| {
            log_backend_error(tool, &e);
            e.to_string()
        });
        ToolCallContent { text }
    }

    async fn do_ls(&self, path: &str) -> Result<String, BackendError> {
        Ok(truncate_listing(self.backend.ls(path).await?))
    }

    async fn do_read_file(&self, file_path: &str, offset: usize, limit: usize) -> Result<String, BackendError> {
        Ok(truncate_text_if_too_long(
            self.backend.read(file_path, offset, limit).await?,
        ))
    }

    async fn do_write_file(&self, file_path: &str, content: &str) -> Result<String, BackendError> {
        let res = self.backend.write(file_path, content).await?;
        Ok(format!("Updated file {}", res.path))
    }

    async fn do_edit_file(
        &self,
        file_path: &str,
        old_string: &str,
        new_string: &str,
        replace_all: bool,
    ) -> Result<String, BackendError> {
        let res = self
            .backend
            .edit(file_path, old_string, new_string, replace_all)
            .await?;
        Ok(format!(
            "Successfully replaced {} instance(s) of the string in '{}'",
            res.occurrences, res.path
        ))
    }

    async fn do_glob(&self, pattern: &str, path: &str) -> Result<String, BackendError> {
        Ok(truncate_listing(self.backend.glob(pattern, path).await?))
    }

    async fn do_grep(
        &self,
        pattern: &str,
        path: Option<&str>,
        glob: Option<&str>,
        output_mode: GrepOutputMode,
    ) -> Result<String, BackendError> {
        Ok(truncate_text_if_too_long(
            self.backend.grep(pattern, path, glob, output_mode).await?,
        ))
    }
}

#[async_trait]
impl ToolSource for FilesystemToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(vec![
            ls_spec(),
            read_file_spec(),
            write_file_spec(),
            edit_file_spec(),
            glob_spec(),
            grep_spec(),
        ])
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallContent, ToolSourceError> {
        let result = match name {
            TOOL_LS => {
                let path = optional_str(&arguments, "path").unwrap_or("/");
                self.do_ls(path).await
            }
            TOOL_READ_FILE => {
                let file_path = required_str(&arguments, "file_path")?;
                let offset = optional_usize(&arguments, "offset").unwrap_or(DEFAULT_READ_OFFSET);
                let limit = optional_usize(&arguments, "limit").unwrap_or(DEFAULT_READ_LIMIT);
                self.do_read_file(file_path, offset, limit).await
            }
            TOOL_WRITE_FILE => {
                let file_path = required_str(&arguments, "file_path")?;
                let content = required_str(&arguments, "content")?;
                self.do_write_file(file_path, content).await
            }
            TOOL_EDIT_FILE => {
                let file_path = required_str(&arguments, "file_path")?;
                let old_string = required_str(&arguments, "old_string")?;
                let new_string = required_str(&arguments, "new_string")?;
                let replace_all = arguments
                    .get("replace_all")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                self.do_edit_file(file_path, old_string, new_string, replace_all)
                    .await
            }
            TOOL_GLOB => {
                let pattern = required_str(&arguments, "pattern")?;
                let path = optional_str(&arguments, "path").unwrap_or("/");
                self.do_glob(pattern, path).await
            }
            TOOL_GREP => {
                let pattern = required_str(&arguments, "pattern")?;
                let output_mode = match optional_str(&arguments, "output_mode") {
                    None => GrepOutputMode::default(),
                    Some(mode) => match mode.parse::<GrepOutputMode>() {
                        Ok(mode) => mode,
                        Err(e) => {
                            return Ok(ToolCallContent {
                                text: format!("Error: {}", e),
                            })
                        }
                    },
                };
                self.do_grep(
                    pattern,
                    optional_str(&arguments, "path"),
                    optional_str(&arguments, "glob"),
                    output_mode,
                )
                .await
            }
            _ => return Err(ToolSourceError::NotFound(name.to_string())),
        };
        Ok(Self::respond(name, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::utils::{EMPTY_CONTENT_WARNING, NO_MATCHES_FOUND, TRUNCATION_GUIDANCE};
    use crate::backends::StateBackend;

    fn source() -> FilesystemToolSource {
        FilesystemToolSource::new(Arc::new(StateBackend::new()))
    }

    async fn call(src: &FilesystemToolSource, name: &str, args: Value) -> String {
        src.call_tool(name, args).await.unwrap().text
    }

    #[tokio::test]
    async fn lists_six_tools() {
        let tools = source().list_tools().await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["ls", "read_file", "write_file", "edit_file", "glob", "grep"]
        );
        assert!(tools.iter().all(|t| t.input_schema["type"] == "object"));
    }

    /// **Scenario**: the tool loop of write, read, edit and grep runs through text results only.
    #[tokio::test]
    async fn write_read_edit_grep() {
        let src = source();
        let out = call(
            &src,
            TOOL_WRITE_FILE,
            json!({ "file_path": "/notes/todo.md", "content": "- buy milk" }),
        )
        .await;
        assert_eq!(out, "Updated file /notes/todo.md");

        let out = call(&src, TOOL_READ_FILE, json!({ "file_path": "/notes/todo.md" })).await;
        assert_eq!(out, "     1\t- buy milk");

        let out = call(
            &src,
            TOOL_EDIT_FILE,
            json!({ "file_path": "/notes/todo.md", "old_string": "milk", "new_string": "eggs" }),
        )
        .await;
        assert_eq!(
            out,
            "Successfully replaced 1 instance(s) of the string in '/notes/todo.md'"
        );

        let out = call(
            &src,
            TOOL_GREP,
            json!({ "pattern": "eggs", "output_mode": "content" }),
        )
        .await;
        assert_eq!(out, "/notes/todo.md:\n  1: - buy eggs");
        assert_eq!(call(&src, TOOL_LS, json!({})).await, "/notes/");
        assert_eq!(
            call(&src, TOOL_GLOB, json!({ "pattern": "**/*.md" })).await,
            "/notes/todo.md"
        );
    }

    /// **Scenario**: backend errors come back as text, never as ToolSourceError.
    #[tokio::test]
    async fn backend_errors_are_text() {
        let src = source();
        let out = call(&src, TOOL_READ_FILE, json!({ "file_path": "/missing.txt" })).await;
        assert_eq!(out, "Error: File '/missing.txt' not found");

        let out = call(&src, TOOL_GREP, json!({ "pattern": "(" })).await;
        assert!(out.starts_with("Invalid regex pattern"));

        let out = call(&src, TOOL_GREP, json!({ "pattern": "x", "output_mode": "lines" })).await;
        assert!(out.starts_with("Error: unknown output_mode"));

        call(&src, TOOL_WRITE_FILE, json!({ "file_path": "/e.txt", "content": "" })).await;
        let out = call(&src, TOOL_READ_FILE, json!({ "file_path": "/e.txt" })).await;
        assert_eq!(out, EMPTY_CONTENT_WARNING);
        let out = call(&src, TOOL_READ_FILE, json!({ "file_path": "/e.txt", "offset": 3 })).await;
        assert_eq!(out, EMPTY_CONTENT_WARNING);

        let out = call(&src, TOOL_GREP, json!({ "pattern": "zzz" })).await;
        assert_eq!(out, NO_MATCHES_FOUND);
    }

    #[tokio::test]
    async fn dispatch_errors() {
        let src = source();
        assert!(matches!(
            src.call_tool("rm", json!({})).await,
            Err(ToolSourceError::NotFound(_))
        ));
        assert!(matches!(
            src.call_tool(TOOL_READ_FILE, json!({})).await,
            Err(ToolSourceError::InvalidInput(_))
        ));
    }

    /// **Scenario**: a read larger than the result budget is cut and ends with guidance.
    #[tokio::test]
    async fn large_read_is_truncated() {
        let src = source();
        let content = vec!["x".repeat(1000); 200].join("\n");
        call(&src, TOOL_WRITE_FILE, json!({ "file_path": "/big.txt", "content": content })).await;
        let out = call(&src, TOOL_READ_FILE, json!({ "file_path": "/big.txt", "limit": 200 })).await;
        assert!(out.ends_with(TRUNCATION_GUIDANCE));
    }
}
