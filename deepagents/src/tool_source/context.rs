//! Context passed into tool calls for the current step.

/// Per-call context available to tools during execution.
///
/// **Interaction**: Passed by the agent runtime to `ToolSource::call_tool_with_context`;
/// read by [`EvictingToolSource`](super::EvictingToolSource) to name the file an oversized
/// result is written to. Other sources ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallContext {
    /// Id the model assigned to this tool call.
    pub tool_call_id: Option<String>,
}

impl ToolCallContext {
    pub fn new(tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}
