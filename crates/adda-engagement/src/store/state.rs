//! Per-entity reaction state and the pure optimistic transitions
//!
//! Nothing here touches the network or the bus; the store drives these
//! functions and decides what to publish.

use adda_core::{DomainError, ReactionCounts, ReactionKind};

/// Lifecycle of one entity's reaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Never fetched; counts are the neutral default
    #[default]
    Unknown,
    /// Counts reflect the last confirmed or refreshed state
    Loaded,
    /// At least one toggle is waiting for the server
    Mutating,
    /// A toggle just failed; left as soon as the rollback is published
    Error,
}

/// Result of predicting a toggle locally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticDelta {
    /// The user's reaction before the toggle
    pub previous: Option<ReactionKind>,
    /// The user's reaction after the toggle (`None` = toggled off)
    pub next: Option<ReactionKind>,
    /// Predicted counts
    pub counts: ReactionCounts,
}

impl OptimisticDelta {
    /// Check if the toggle removes the user's reaction
    #[inline]
    pub fn is_removal(&self) -> bool {
        self.next.is_none()
    }
}

/// Predict the outcome of toggling `kind` when the user currently holds `current`.
///
/// Toggling the held kind removes it; any other kind replaces the held one.
/// Counts never go below zero.
#[must_use]
pub fn apply_optimistic(
    current: Option<ReactionKind>,
    counts: &ReactionCounts,
    kind: ReactionKind,
) -> OptimisticDelta {
    let toggling_off = current == Some(kind);
    let next = if toggling_off { None } else { Some(kind) };

    let mut predicted = *counts;
    if let Some(prior) = current {
        predicted.decrement(prior);
    }
    if !toggling_off {
        predicted.increment(kind);
    }

    OptimisticDelta {
        previous: current,
        next,
        counts: predicted,
    }
}

/// Predict a toggle on the legacy like endpoint.
///
/// That endpoint only knows likes: the `like` count moves by one and no
/// other kind is touched, even when the user holds a different reaction.
#[must_use]
pub fn apply_optimistic_like(
    current: Option<ReactionKind>,
    counts: &ReactionCounts,
) -> OptimisticDelta {
    let liked = current == Some(ReactionKind::Like);
    let mut predicted = *counts;
    if liked {
        predicted.decrement(ReactionKind::Like);
    } else {
        predicted.increment(ReactionKind::Like);
    }

    OptimisticDelta {
        previous: current,
        next: (!liked).then_some(ReactionKind::Like),
        counts: predicted,
    }
}

/// Authoritative counts replace local counts wholesale
#[must_use]
pub fn apply_snapshot(counts: ReactionCounts) -> ReactionCounts {
    counts
}

/// What a successful mutation response tells us about the counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmed {
    /// Full per-kind counts
    Full(ReactionCounts),
    /// Legacy like endpoint: only the `like` count
    Likes(u64),
    /// No counts in the response; keep the prediction
    Nothing,
}

impl Confirmed {
    /// Fold the confirmation into the predicted counts
    #[must_use]
    pub fn resolve(self, predicted: ReactionCounts) -> ReactionCounts {
        match self {
            Self::Full(counts) => apply_snapshot(counts),
            Self::Likes(likes) => {
                let mut counts = predicted;
                counts.set(ReactionKind::Like, likes);
                counts
            }
            Self::Nothing => predicted,
        }
    }
}

/// How the newest toggle for an entity ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatestResponse {
    #[default]
    Pending,
    Succeeded,
    Failed,
}

/// State kept for one entity
#[derive(Debug, Clone, Default)]
pub struct EntryState {
    pub phase: Phase,
    pub current_reaction: Option<ReactionKind>,
    pub counts: ReactionCounts,
    /// Last reaction the server acknowledged (check, poll or accepted toggle)
    pub confirmed_reaction: Option<ReactionKind>,
    /// Counts that go with `confirmed_reaction`
    pub confirmed_counts: ReactionCounts,
    /// Sequence number of the newest toggle issued for this entity
    pub latest_seq: u64,
    pub latest_response: LatestResponse,
    /// Toggles sent but not yet answered
    pub in_flight: u32,
    pub last_error: Option<DomainError>,
    /// Mounted views bound to this entity
    pub mounts: u32,
    /// Every view left while a toggle was in flight; drop once idle
    pub evict_when_idle: bool,
}

impl EntryState {
    /// Read-only copy handed out to callers
    #[must_use]
    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            phase: self.phase,
            current_reaction: self.current_reaction,
            counts: self.counts,
            last_error: self.last_error.clone(),
        }
    }

    /// Record authoritative state
    pub(crate) fn confirm(&mut self, reaction: Option<ReactionKind>, counts: ReactionCounts) {
        self.confirmed_reaction = reaction;
        self.confirmed_counts = counts;
    }

    /// Put the last acknowledged state back; `true` if anything changed
    pub(crate) fn restore_confirmed(&mut self) -> bool {
        let changed = self.current_reaction != self.confirmed_reaction
            || self.counts != self.confirmed_counts;
        self.current_reaction = self.confirmed_reaction;
        self.counts = self.confirmed_counts;
        changed
    }

    /// Nothing mounted and nothing in flight
    pub(crate) fn is_idle(&self) -> bool {
        self.mounts == 0 && self.in_flight == 0
    }

    /// Phase to settle in once a response has been handled
    pub(crate) fn settled_phase(&self) -> Phase {
        if self.in_flight > 0 {
            Phase::Mutating
        } else {
            Phase::Loaded
        }
    }
}

/// Point-in-time view of an entity's reaction state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub phase: Phase,
    pub current_reaction: Option<ReactionKind>,
    pub counts: ReactionCounts,
    pub last_error: Option<DomainError>,
}
