//! Stock collaborator implementations for headless use

use adda_core::{
    CommentAuthor, DomainResult, EntityRef, IdentityProvider, Notifier, NotifyLevel, RewardEvent,
    RewardTrigger,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Identity backed by a fixed bearer token (CLI, scripts)
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    token: Option<String>,
    user: Option<CommentAuthor>,
}

impl StaticIdentity {
    /// Signed in with `token`
    pub fn signed_in(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    /// Nobody signed in
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Use `token` if present and non-empty
    pub fn from_token(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            user: None,
        }
    }

    /// Display identity for optimistic comments
    #[must_use]
    pub fn with_user(mut self, user: CommentAuthor) -> Self {
        self.user = Some(user);
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    fn prompt_sign_in(&self) {
        info!("Sign-in required; set ADDA_ACCESS_TOKEN");
    }

    fn current_user(&self) -> Option<CommentAuthor> {
        self.user.clone()
    }
}

/// Notifier that writes toasts to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Success => info!(message, "Notification"),
            NotifyLevel::Error => warn!(message, "Notification"),
        }
    }
}

/// Reward trigger that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRewards;

#[async_trait]
impl RewardTrigger for NoopRewards {
    async fn trigger_reward(&self, event: RewardEvent, entity: &EntityRef) -> DomainResult<()> {
        debug!(event = event.as_str(), entity = %entity, "Reward skipped");
        Ok(())
    }
}
