//! Reaction store - per-entity optimistic state and reconciliation

use std::sync::Arc;

use adda_core::{
    DomainResult, EngagementApi, EntityRef, ReactionCheck, ReactionCounts, ReactionEvent,
    ReactionEventSource, ReactionKind, UserReactionState,
};
use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};

use super::state::{
    apply_optimistic, apply_optimistic_like, apply_snapshot, Confirmed, EntrySnapshot, EntryState,
    LatestResponse, OptimisticDelta, Phase,
};
use crate::bus::EngagementEventBus;

/// What became of a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change
    Applied {
        previous: Option<ReactionKind>,
        current: Option<ReactionKind>,
    },
    /// A newer toggle for the same entity was issued before this one finished;
    /// its response was discarded
    Superseded,
    /// Nobody is signed in; nothing was changed or sent
    SignInRequired,
}

impl ToggleOutcome {
    /// Check if the toggle added (or switched to) a reaction
    #[inline]
    pub fn added(&self) -> bool {
        matches!(self, Self::Applied { current: Some(_), .. })
    }
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Reactions,
    LegacyLike,
}

/// Single source of truth for reaction state on the client.
///
/// Every local change is published on the bus. Map guards are never held
/// across an `.await` or while publishing.
pub struct ReactionStore {
    api: Arc<dyn EngagementApi>,
    bus: EngagementEventBus,
    entries: DashMap<EntityRef, EntryState>,
}

impl ReactionStore {
    /// Create an empty store
    pub fn new(api: Arc<dyn EngagementApi>, bus: EngagementEventBus) -> Self {
        Self {
            api,
            bus,
            entries: DashMap::new(),
        }
    }

    /// Fetch the user's reaction and the counts.
    ///
    /// On failure the entry keeps its previous phase (`Unknown` for a first load).
    #[instrument(skip(self, entity), fields(entity = %entity))]
    pub async fn load(&self, entity: &EntityRef) -> DomainResult<ReactionCheck> {
        let check = self.api.check_reaction(entity).await?;
        let applied = self.apply_check(entity, check);
        debug!(total = applied.counts.total(), reaction = ?applied.user_reaction, "Reactions loaded");
        Ok(applied)
    }

    /// Poll path: fetch authoritative state and reconcile
    #[instrument(skip(self, entity), fields(entity = %entity))]
    pub async fn refresh(&self, entity: &EntityRef) -> DomainResult<ReactionCounts> {
        let check = self.api.check_reaction(entity).await?;
        Ok(self.apply_check(entity, check).counts)
    }

    /// Toggle `kind` for the signed-in user.
    ///
    /// Toggling the held kind removes it; any other kind replaces it.
    pub async fn toggle(&self, entity: &EntityRef, kind: ReactionKind) -> DomainResult<ToggleOutcome> {
        self.mutate(entity, kind, Endpoint::Reactions).await
    }

    /// Toggle `like` through the legacy like endpoint
    pub async fn toggle_legacy_like(&self, entity: &EntityRef) -> DomainResult<ToggleOutcome> {
        self.mutate(entity, ReactionKind::Like, Endpoint::LegacyLike).await
    }

    /// Overwrite the counts with authoritative values and publish exactly once
    pub fn reconcile_from_poll(&self, entity: &EntityRef, counts: ReactionCounts) {
        let counts = {
            let mut entry = self.entries.entry(entity.clone()).or_default();
            entry.counts = apply_snapshot(counts);
            entry.confirmed_counts = entry.counts;
            if entry.phase == Phase::Unknown {
                entry.phase = Phase::Loaded;
            }
            entry.counts
        };
        self.publish(entity, counts, ReactionEventSource::Refreshed);
    }

    /// Register a mounted view for `entity`
    pub fn retain(&self, entity: &EntityRef) {
        let mut entry = self.entries.entry(entity.clone()).or_default();
        entry.mounts += 1;
        entry.evict_when_idle = false;
    }

    /// A mounted view went away; the entry is dropped once nothing uses it
    pub fn release(&self, entity: &EntityRef) {
        if let Some(mut entry) = self.entries.get_mut(entity) {
            entry.mounts = entry.mounts.saturating_sub(1);
            entry.evict_when_idle = entry.mounts == 0;
        }
        self.evict_if_idle(entity);
    }

    /// Drop an entity's state unless a view is mounted or a toggle is in flight
    pub fn forget(&self, entity: &EntityRef) -> bool {
        self.entries
            .remove_if(entity, |_, entry| entry.is_idle())
            .is_some()
    }

    fn evict_if_idle(&self, entity: &EntityRef) {
        let evicted = self
            .entries
            .remove_if(entity, |_, entry| entry.evict_when_idle && entry.is_idle())
            .is_some();
        if evicted {
            debug!(entity = %entity, "Reaction state evicted");
        }
    }

    #[instrument(skip_all, fields(entity = %entity, kind = ?kind, endpoint = ?endpoint))]
    async fn mutate(
        &self,
        entity: &EntityRef,
        kind: ReactionKind,
        endpoint: Endpoint,
    ) -> DomainResult<ToggleOutcome> {
        let (seq, delta, before) = {
            let mut entry = self.entries.entry(entity.clone()).or_default();
            let before = (entry.current_reaction, entry.counts);
            let delta = match endpoint {
                Endpoint::Reactions => {
                    apply_optimistic(entry.current_reaction, &entry.counts, kind)
                }
                Endpoint::LegacyLike => {
                    apply_optimistic_like(entry.current_reaction, &entry.counts)
                }
            };

            entry.latest_seq += 1;
            entry.latest_response = LatestResponse::Pending;
            entry.in_flight += 1;
            entry.current_reaction = delta.next;
            entry.counts = delta.counts;
            entry.phase = Phase::Mutating;
            (entry.latest_seq, delta, before)
        };

        self.publish(entity, delta.counts, ReactionEventSource::Optimistic);

        let result = match endpoint {
            Endpoint::Reactions => self
                .api
                .set_reaction(entity, delta.next)
                .await
                .map(|counts| counts.map_or(Confirmed::Nothing, Confirmed::Full)),
            Endpoint::LegacyLike => self
                .api
                .set_liked(entity, delta.next.is_some())
                .await
                .map(|likes| likes.map_or(Confirmed::Nothing, Confirmed::Likes)),
        };

        self.settle(entity, seq, delta, before, result)
    }

    fn settle(
        &self,
        entity: &EntityRef,
        seq: u64,
        delta: OptimisticDelta,
        before: (Option<ReactionKind>, ReactionCounts),
        result: DomainResult<Confirmed>,
    ) -> DomainResult<ToggleOutcome> {
        let mut entry = self.entries.entry(entity.clone()).or_default();
        entry.in_flight = entry.in_flight.saturating_sub(1);

        if seq != entry.latest_seq {
            debug!(
                seq,
                latest = entry.latest_seq,
                failed = result.is_err(),
                "Discarding superseded response"
            );
            // an accepted newest toggle outranks older ones
            if let Ok(confirmed) = result {
                if entry.latest_response != LatestResponse::Succeeded {
                    entry.confirm(delta.next, confirmed.resolve(delta.counts));
                }
            }
            entry.phase = entry.settled_phase();

            // the newest toggle failed and rolled back onto predictions that
            // never reached the server
            let repaired = entry.in_flight == 0
                && entry.latest_response == LatestResponse::Failed
                && entry.restore_confirmed();
            let (reaction, counts) = (entry.current_reaction, entry.counts);
            drop(entry);

            if repaired {
                warn!(
                    reaction = ?reaction,
                    total = counts.total(),
                    "Restored last confirmed reaction"
                );
                self.publish(entity, counts, ReactionEventSource::Rollback);
            }
            self.evict_if_idle(entity);
            return Ok(ToggleOutcome::Superseded);
        }

        match result {
            Ok(confirmed) => {
                entry.counts = confirmed.resolve(entry.counts);
                let (reaction, counts) = (entry.current_reaction, entry.counts);
                entry.confirm(reaction, counts);
                entry.latest_response = LatestResponse::Succeeded;
                entry.phase = entry.settled_phase();
                entry.last_error = None;
                drop(entry);

                info!(previous = ?delta.previous, current = ?delta.next, total = counts.total(), "Reaction confirmed");
                self.publish(entity, counts, ReactionEventSource::Confirmed);
                self.evict_if_idle(entity);

                Ok(ToggleOutcome::Applied {
                    previous: delta.previous,
                    current: delta.next,
                })
            }
            Err(err) => {
                // older toggles still pending restore the confirmed state
                // when the last of them lands
                if entry.in_flight == 0 {
                    entry.restore_confirmed();
                } else {
                    let (reaction, counts) = before;
                    entry.current_reaction = reaction;
                    entry.counts = counts;
                }
                entry.latest_response = LatestResponse::Failed;
                entry.phase = Phase::Error;
                entry.last_error = Some(err.clone());
                let counts = entry.counts;
                drop(entry);

                warn!(error = %err, code = err.code(), "Reaction failed, rolling back");
                self.publish(entity, counts, ReactionEventSource::Rollback);

                if let Some(mut entry) = self.entries.get_mut(entity) {
                    if entry.phase == Phase::Error {
                        entry.phase = entry.settled_phase();
                    }
                }
                self.evict_if_idle(entity);
                Err(err)
            }
        }
    }

    fn apply_check(&self, entity: &EntityRef, check: ReactionCheck) -> ReactionCheck {
        let applied = {
            let mut entry = self.entries.entry(entity.clone()).or_default();
            entry.counts = apply_snapshot(check.counts);
            entry.confirm(check.user_reaction, check.counts);
            // a pending toggle owns the user's reaction until it settles
            if entry.in_flight == 0 {
                entry.current_reaction = check.user_reaction;
                entry.phase = Phase::Loaded;
            }
            ReactionCheck {
                user_reaction: entry.current_reaction,
                counts: entry.counts,
            }
        };
        self.publish(entity, applied.counts, ReactionEventSource::Refreshed);
        applied
    }

    fn publish(&self, entity: &EntityRef, counts: ReactionCounts, source: ReactionEventSource) {
        self.bus
            .publish(&ReactionEvent::new(entity.clone(), counts, source));
    }

    // === Accessors ===

    /// Copy of an entity's state, `None` if it was never touched
    pub fn snapshot(&self, entity: &EntityRef) -> Option<EntrySnapshot> {
        self.entries.get(entity).map(|entry| entry.snapshot())
    }

    /// Current phase (`Unknown` for untouched entities)
    pub fn phase(&self, entity: &EntityRef) -> Phase {
        self.entries.get(entity).map_or(Phase::Unknown, |entry| entry.phase)
    }

    /// Current counts (all zero for untouched entities)
    pub fn counts(&self, entity: &EntityRef) -> ReactionCounts {
        self.entries.get(entity).map(|entry| entry.counts).unwrap_or_default()
    }

    /// The user's reaction, including an optimistic one
    pub fn current_reaction(&self, entity: &EntityRef) -> Option<ReactionKind> {
        self.entries.get(entity).and_then(|entry| entry.current_reaction)
    }

    /// The user's reaction as a domain value
    pub fn user_state(&self, entity: &EntityRef) -> UserReactionState {
        UserReactionState {
            entity: entity.clone(),
            current_reaction: self.current_reaction(entity),
        }
    }

    /// Number of entities with state
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entity has state yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ReactionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionStore")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
