//! Logging utilities for backend routing and tool dispatch.
//!
//! Structured events for composite routing, skipped mounts during fan-out, errors handed back
//! to the agent as text, and evicted tool results.

/// Log which backend a composite call was routed to.
///
/// `prefix` is `None` when the default backend served the call.
pub fn log_route(operation: &str, path: &str, prefix: Option<&str>) {
    #[cfg(feature = "tracing")]
    tracing::debug!(operation, path, mount = prefix.unwrap_or("<default>"), "Routed call");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[DEBUG] Routed {} {} -> {}",
        operation,
        path,
        prefix.unwrap_or("<default>")
    );
}

/// Log a mount that failed during glob/grep fan-out and was left out of the merged result.
pub fn log_mount_skipped(operation: &str, prefix: Option<&str>, error: &crate::error::BackendError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        operation,
        mount = prefix.unwrap_or("<default>"),
        %error,
        "Mount failed during fan-out; returning partial results"
    );

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[WARN] {} skipped mount {}: {}",
        operation,
        prefix.unwrap_or("<default>"),
        error
    );
}

/// Log a backend error that is being returned to the agent as tool output.
///
/// Storage failures are logged at error level; expected outcomes (missing file, bad pattern)
/// at debug.
pub fn log_backend_error(tool: &str, error: &crate::error::BackendError) {
    #[cfg(feature = "tracing")]
    if error.is_storage_failure() {
        tracing::error!(tool, ?error, "Backend storage failure");
    } else {
        tracing::debug!(tool, %error, "Backend returned error to agent");
    }

    #[cfg(not(feature = "tracing"))]
    if error.is_storage_failure() {
        eprintln!("[ERROR] {} storage failure: {:?}", tool, error);
    }
}

/// Log a tool result that was too large to inline and was written to a file instead.
pub fn log_eviction(tool: &str, path: &str, chars: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(tool, path, chars, "Evicted large tool result");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[INFO] Evicted {} result ({} chars) to {}", tool, chars, path);
}
