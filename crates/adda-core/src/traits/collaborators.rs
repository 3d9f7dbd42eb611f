//! External collaborators consumed by the engagement core

use async_trait::async_trait;

use crate::entities::{CommentAuthor, EntityRef};
use crate::error::DomainResult;

/// Session capability supplied by the identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Bearer token for the current session, `None` when signed out
    async fn token(&self) -> Option<String>;

    /// Whether a user is signed in right now
    fn is_signed_in(&self) -> bool;

    /// Send the user to the sign-in prompt
    fn prompt_sign_in(&self);

    /// Display identity used for optimistic comments
    fn current_user(&self) -> Option<CommentAuthor> {
        None
    }
}

/// Gamification events sent to the reward service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardEvent {
    Reaction,
    Comment,
    Save,
}

impl RewardEvent {
    /// Wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reaction => "reaction",
            Self::Comment => "comment",
            Self::Save => "save",
        }
    }
}

/// Reward service; calls are fire-and-forget and failures are ignored
#[async_trait]
pub trait RewardTrigger: Send + Sync {
    async fn trigger_reward(&self, event: RewardEvent, entity: &EntityRef) -> DomainResult<()>;
}

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Error,
}

/// User-visible feedback
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotifyLevel, message: &str);
}
