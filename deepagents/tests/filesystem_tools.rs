//! Integration tests for FilesystemToolSource and EvictingToolSource over a composite stack.

use std::sync::Arc;

use deepagents::tool_source::{TOOL_GLOB, TOOL_GREP, TOOL_LS, TOOL_READ_FILE, TOOL_WRITE_FILE};
use deepagents::{
    Backend, CompositeBackend, EvictingToolSource, FilesystemToolSource, InMemoryStore,
    RunnableConfig, StateBackend, Store, StoreBackend, ToolCallContext, ToolSource,
};
use serde_json::json;

fn router() -> Arc<dyn Backend> {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let memories: Arc<dyn Backend> = Arc::new(StoreBackend::from_config(
        store,
        &RunnableConfig::for_user("u1"),
    ));
    Arc::new(CompositeBackend::with_default(
        Arc::new(StateBackend::new()),
        [("/memories/", memories)],
    ))
}

/// **Scenario**: Given a composite backend behind the file tools, the agent's tool calls see
/// one namespace and every failure comes back as text.
#[tokio::test]
async fn tool_calls_over_composite() {
    let tools = FilesystemToolSource::new(router());
    let r = tools
        .call_tool(TOOL_WRITE_FILE, json!({ "file_path": "/memories/user.md", "content": "likes tea" }))
        .await
        .unwrap();
    assert_eq!(r.text, "Updated file /memories/user.md");

    let r = tools
        .call_tool(TOOL_WRITE_FILE, json!({ "file_path": "/memories/user.md", "content": "again" }))
        .await
        .unwrap();
    assert!(r.text.contains("already exists"));

    let r = tools.call_tool(TOOL_LS, json!({ "path": "/" })).await.unwrap();
    assert_eq!(r.text, "/memories/");

    let r = tools
        .call_tool(TOOL_GLOB, json!({ "pattern": "**/*.md" }))
        .await
        .unwrap();
    assert_eq!(r.text, "/memories/user.md");

    let r = tools
        .call_tool(TOOL_GREP, json!({ "pattern": "tea", "output_mode": "content" }))
        .await
        .unwrap();
    assert_eq!(r.text, "/memories/user.md:\n  1: likes tea");
}

/// **Scenario**: an evicted result can be paged back with read_file through the same tools.
#[tokio::test]
async fn evicted_result_is_readable() {
    let backend = router();
    let tools = EvictingToolSource::new(FilesystemToolSource::new(backend.clone()), backend)
        .with_char_limit(100);
    let content: Vec<String> = (1..=30).map(|i| format!("row {}", i)).collect();
    tools
        .call_tool(TOOL_WRITE_FILE, json!({ "file_path": "/rows.txt", "content": content.join("\n") }))
        .await
        .unwrap();

    let ctx = ToolCallContext::new("toolu_01");
    let r = tools
        .call_tool_with_context(TOOL_GREP, json!({ "pattern": "row", "output_mode": "content" }), Some(&ctx))
        .await
        .unwrap();
    assert!(r.text.contains("/large_tool_results/toolu_01"));

    let r = tools
        .call_tool(
            TOOL_READ_FILE,
            json!({ "file_path": "/large_tool_results/toolu_01", "offset": 0, "limit": 2 }),
        )
        .await
        .unwrap();
    assert_eq!(r.text, "     1\t/rows.txt:\n     2\t  1: row 1");
}
