//! Unit tests for [`run_with_config`](crate::run_with_config) and
//! [`build_backend`](crate::build_backend).
//!
//! Each test runs against a temp directory as the filesystem root.

use deepagents::Backend;
use serde_json::json;

use crate::config::RunConfig;
use crate::{build_backend, run_with_config, ToolCall};

fn config(root: &std::path::Path) -> RunConfig {
    RunConfig {
        root_dir: root.to_path_buf(),
        user_id: Some("u1".into()),
        ..RunConfig::default()
    }
}

/// **Scenario**: a write through the CLI lands on disk under the root and reads back.
///
/// Given: a temp dir as ROOT_DIR  
/// When: write_file then read_file run as separate calls  
/// Then: the file exists on disk and read returns numbered lines
#[tokio::test]
async fn write_then_read_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());

    let out = run_with_config(
        &cfg,
        &ToolCall::new("write_file", json!({ "file_path": "/docs/a.md", "content": "hello" })),
    )
    .await
    .unwrap();
    assert_eq!(out, "Updated file /docs/a.md");
    assert!(dir.path().join("docs/a.md").is_file());

    let out = run_with_config(&cfg, &ToolCall::new("read_file", json!({ "file_path": "/docs/a.md" })))
        .await
        .unwrap();
    assert_eq!(out, "     1\thello");
}

/// **Scenario**: backend errors are printed as tool text, dispatch errors are Err.
#[tokio::test]
async fn errors_split_between_text_and_err() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let out = run_with_config(&cfg, &ToolCall::new("read_file", json!({ "file_path": "/nope" })))
        .await
        .unwrap();
    assert_eq!(out, "Error: File '/nope' not found");

    let out = run_with_config(&cfg, &ToolCall::new("read_file", json!({ "file_path": "/../x" })))
        .await
        .unwrap();
    assert!(out.starts_with("Error: Path escapes root"), "{}", out);

    assert!(run_with_config(&cfg, &ToolCall::new("rm", json!({}))).await.is_err());
}

/// **Scenario**: a verbose run prints the stack summary and still returns the tool output.
///
/// Given: a config with verbose set  
/// When: glob runs over a root holding one markdown file  
/// Then: the output is that file
#[tokio::test]
async fn verbose_run_returns_output() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.md"), "n").unwrap();
    let cfg = RunConfig {
        verbose: true,
        ..config(dir.path())
    };
    let out = run_with_config(&cfg, &ToolCall::new("glob", json!({ "pattern": "*.md" })))
        .await
        .unwrap();
    assert_eq!(out, "/notes.md");
}

/// **Scenario**: the built stack mounts memories beside the filesystem root.
#[tokio::test]
async fn stack_mounts_memories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("README.md"), "# project").unwrap();
    let backend = build_backend(&config(dir.path()).backend_config()).unwrap();

    backend.write("/memories/prefs.md", "tabs").await.unwrap();
    assert!(!dir.path().join("memories").exists());
    assert_eq!(backend.ls("/").await.unwrap(), "/README.md\n/memories/");
}

/// **Scenario**: with DB_PATH, memories persist across separate runs.
#[cfg(feature = "sqlite")]
#[tokio::test]
async fn sqlite_memories_persist_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("mem.db");
    let root = tempfile::tempdir().unwrap();
    let cfg = RunConfig {
        db_path: Some(db.to_string_lossy().into_owned()),
        ..config(root.path())
    };

    run_with_config(
        &cfg,
        &ToolCall::new("write_file", json!({ "file_path": "/memories/m.md", "content": "kept" })),
    )
    .await
    .unwrap();
    let out = run_with_config(&cfg, &ToolCall::new("read_file", json!({ "file_path": "/memories/m.md" })))
        .await
        .unwrap();
    assert_eq!(out, "     1\tkept");
}
