//! Caller identity passed to backends that scope data per user or assistant.

/// Identity of the current invocation: thread, user and assistant ids.
///
/// **Interaction**: Read by [`StoreBackend::from_config`](crate::backends::StoreBackend::from_config)
/// to derive the store namespace; the state backend is already per-thread by construction.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Conversation/session id.
    pub thread_id: Option<String>,
    /// User id; scopes the persistent store namespace.
    pub user_id: Option<String>,
    /// Assistant id; scopes the store namespace when no user id is set.
    pub assistant_id: Option<String>,
}

impl RunnableConfig {
    /// Config scoped to a user.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// The id that scopes long-term storage: user id first, then assistant id.
    pub fn scope_id(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.assistant_id.as_deref())
    }
}
