//! Engagement API port

use async_trait::async_trait;

use crate::entities::{Comment, EntityRef, ReactionCheck, ReactionCounts, ReactionKind, Reactor};
use crate::error::DomainResult;

/// Request/response boundary to the remote engagement API.
///
/// Implementations are stateless and never retry; a failed call surfaces
/// immediately and the caller rolls back its own optimistic state.
#[async_trait]
pub trait EngagementApi: Send + Sync {
    /// The user's reaction and the aggregate counts
    async fn check_reaction(&self, entity: &EntityRef) -> DomainResult<ReactionCheck>;

    /// Set (`Some`) or remove (`None`) the user's reaction.
    ///
    /// Returns the authoritative counts when the server sends them.
    async fn set_reaction(
        &self,
        entity: &EntityRef,
        kind: Option<ReactionKind>,
    ) -> DomainResult<Option<ReactionCounts>>;

    /// Legacy single-reaction like path; returns the like count when sent
    async fn set_liked(&self, entity: &EntityRef, liked: bool) -> DomainResult<Option<u64>>;

    /// Snapshot of who reacted
    async fn list_reactors(&self, entity: &EntityRef) -> DomainResult<Vec<Reactor>>;

    /// Post a comment; the returned comment carries the server id
    async fn add_comment(&self, entity: &EntityRef, body: &str) -> DomainResult<Comment>;

    /// Authoritative comment list
    async fn list_comments(&self, entity: &EntityRef) -> DomainResult<Vec<Comment>>;

    /// Save or unsave an entity
    async fn set_saved(&self, entity: &EntityRef, saved: bool) -> DomainResult<()>;
}
