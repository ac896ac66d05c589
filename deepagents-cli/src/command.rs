//! File commands accepted on the command line and their tool-call form.

use clap::Subcommand;
use deepagents::tool_source::{
    TOOL_EDIT_FILE, TOOL_GLOB, TOOL_GREP, TOOL_LS, TOOL_READ_FILE, TOOL_WRITE_FILE,
};
use deepagents::GrepOutputMode;
use serde_json::{json, Map, Value};

/// One file operation; each maps onto exactly one agent tool.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum FsCommand {
    /// List a directory
    Ls {
        /// Directory path
        #[arg(default_value = "/")]
        path: String,
    },
    /// Read a file with line numbers
    Read {
        file_path: String,
        /// 0-based line to start from
        #[arg(long)]
        offset: Option<usize>,
        /// Max lines to read
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Create a new file
    Write { file_path: String, content: String },
    /// Replace a string in a file
    Edit {
        file_path: String,
        old_string: String,
        new_string: String,
        /// Replace every occurrence
        #[arg(long)]
        replace_all: bool,
    },
    /// Find files by glob pattern
    Glob {
        pattern: String,
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Search file contents by regex
    Grep {
        pattern: String,
        #[arg(long)]
        path: Option<String>,
        /// Only search files whose name matches this glob
        #[arg(long)]
        glob: Option<String>,
        /// files_with_matches, content or count
        #[arg(long, default_value_t = GrepOutputMode::FilesWithMatches)]
        output_mode: GrepOutputMode,
    },
}

/// A tool name plus JSON arguments, as an agent runtime would issue it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: &str, arguments: Value) -> Self {
        Self {
            name: name.to_string(),
            arguments,
        }
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        map.insert(key.to_string(), v);
    }
}

impl From<&FsCommand> for ToolCall {
    fn from(cmd: &FsCommand) -> Self {
        match cmd {
            FsCommand::Ls { path } => ToolCall::new(TOOL_LS, json!({ "path": path })),
            FsCommand::Read {
                file_path,
                offset,
                limit,
            } => {
                let mut args = Map::new();
                args.insert("file_path".into(), json!(file_path));
                insert_opt(&mut args, "offset", offset.map(|n| json!(n)));
                insert_opt(&mut args, "limit", limit.map(|n| json!(n)));
                ToolCall::new(TOOL_READ_FILE, Value::Object(args))
            }
            FsCommand::Write { file_path, content } => ToolCall::new(
                TOOL_WRITE_FILE,
                json!({ "file_path": file_path, "content": content }),
            ),
            FsCommand::Edit {
                file_path,
                old_string,
                new_string,
                replace_all,
            } => ToolCall::new(
                TOOL_EDIT_FILE,
                json!({
                    "file_path": file_path,
                    "old_string": old_string,
                    "new_string": new_string,
                    "replace_all": replace_all
                }),
            ),
            FsCommand::Glob { pattern, path } => {
                ToolCall::new(TOOL_GLOB, json!({ "pattern": pattern, "path": path }))
            }
            FsCommand::Grep {
                pattern,
                path,
                glob,
                output_mode,
            } => {
                let mut args = Map::new();
                args.insert("pattern".into(), json!(pattern));
                insert_opt(&mut args, "path", path.as_ref().map(|p| json!(p)));
                insert_opt(&mut args, "glob", glob.as_ref().map(|g| json!(g)));
                args.insert("output_mode".into(), json!(output_mode.as_str()));
                ToolCall::new(TOOL_GREP, Value::Object(args))
            }
        }
    }
}
