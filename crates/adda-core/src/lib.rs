//! # adda-core
//!
//! Domain layer for Adda engagement: entity keys, reactions, comments, events,
//! and the traits the engagement core uses to reach the outside world.
//! This crate has zero dependencies on infrastructure (HTTP, runtime, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{
    Comment, CommentAuthor, CommentDraft, CommentId, EntityKind, EntityRef, EntityRefParseError,
    ReactionCheck, ReactionCounts, ReactionKind, Reactor, UnknownReactionKind, UserReactionState,
};
pub use error::{DomainError, DomainResult};
pub use events::{ReactionEvent, ReactionEventSource};
pub use traits::{EngagementApi, IdentityProvider, Notifier, NotifyLevel, RewardEvent, RewardTrigger};
