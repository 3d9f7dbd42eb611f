//! Reaction events - broadcast whenever an entity's counts are known to change
//!
//! Events are transient: they have no identity and are dropped once every
//! subscriber has seen them.

use crate::entities::{EntityRef, ReactionCounts};

/// Why the counts changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionEventSource {
    /// Local prediction before the server answered
    Optimistic,
    /// Counts confirmed by a mutation response
    Confirmed,
    /// Pre-mutation counts restored after a failure
    Rollback,
    /// Counts fetched by a load or poll
    Refreshed,
}

/// Counts update for one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub entity: EntityRef,
    pub counts: ReactionCounts,
    pub source: ReactionEventSource,
}

impl ReactionEvent {
    /// Create a new ReactionEvent
    pub fn new(entity: EntityRef, counts: ReactionCounts, source: ReactionEventSource) -> Self {
        Self {
            entity,
            counts,
            source,
        }
    }

    /// Check if this event concerns `entity` (compared by value)
    #[inline]
    pub fn is_for(&self, entity: &EntityRef) -> bool {
        &self.entity == entity
    }
}
