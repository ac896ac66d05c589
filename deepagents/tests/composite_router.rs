//! Integration tests for CompositeBackend over heterogeneous mounts.
//!
//! Filesystem default at `/`, store-backed memories at `/memories/`, state scratch space at
//! `/scratch/`.

use std::sync::Arc;

use deepagents::{
    Backend, BackendError, CompositeBackend, FilesystemBackend, GrepOutputMode, InMemoryStore,
    RunnableConfig, StateBackend, Store, StoreBackend,
};

struct Stack {
    _dir: tempfile::TempDir,
    store: Arc<dyn Store>,
    router: CompositeBackend,
}

fn stack() -> Stack {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let memories: Arc<dyn Backend> = Arc::new(StoreBackend::from_config(
        store.clone(),
        &RunnableConfig::for_user("u1"),
    ));
    let scratch: Arc<dyn Backend> = Arc::new(StateBackend::new());
    let router = CompositeBackend::with_default(
        Arc::new(FilesystemBackend::new(dir.path())),
        [("/memories/", memories), ("/scratch/", scratch)],
    );
    Stack {
        _dir: dir,
        store,
        router,
    }
}

/// **Scenario**: Given three mounted backends, when the agent writes through each prefix, then
/// reading back through the router returns identical content.
#[tokio::test]
async fn round_trip_through_every_mount() {
    let s = stack();
    for path in ["/src/lib.rs", "/memories/prefs.md", "/scratch/plan.md"] {
        s.router.write(path, "hello\nworld").await.unwrap();
        assert_eq!(
            s.router.read(path, 0, 10).await.unwrap(),
            "     1\thello\n     2\tworld",
            "{}",
            path
        );
    }
    // The store mount holds the stripped key under the user's namespace.
    let ns = vec!["filesystem".to_string(), "u1".to_string()];
    assert_eq!(s.store.list(&ns).await.unwrap(), vec!["/prefs.md".to_string()]);
}

#[tokio::test]
async fn ls_root_lists_default_and_mounts() {
    let s = stack();
    s.router.write("/README.md", "# hi").await.unwrap();
    assert_eq!(
        s.router.ls("/").await.unwrap(),
        "/README.md\n/memories/\n/scratch/"
    );
}

/// **Scenario**: grep across all mounts merges matches and keeps router-absolute paths.
#[tokio::test]
async fn grep_merges_across_mounts() {
    let s = stack();
    s.router.write("/src/lib.rs", "// TODO: docs").await.unwrap();
    s.router.write("/memories/prefs.md", "TODO: remember").await.unwrap();
    s.router.write("/scratch/plan.md", "nothing here").await.unwrap();

    let out = s
        .router
        .grep("TODO", None, None, GrepOutputMode::Count)
        .await
        .unwrap();
    assert_eq!(out, "/memories/prefs.md: 1\n/src/lib.rs: 1");

    let out = s
        .router
        .grep("TODO", None, Some("*.md"), GrepOutputMode::FilesWithMatches)
        .await
        .unwrap();
    assert_eq!(out, "/memories/prefs.md");
}

/// **Scenario**: a router without a default rejects paths outside every mount.
#[tokio::test]
async fn path_outside_mounts_is_not_found() {
    let memories: Arc<dyn Backend> = Arc::new(StateBackend::new());
    let router = CompositeBackend::new([("/memories/", memories)]);
    let err = router.read("/etc/passwd", 0, 10).await.unwrap_err();
    assert!(matches!(err, BackendError::NoMount(_)));
    assert!(router.edit("/x", "a", "b", false).await.is_err());
}
