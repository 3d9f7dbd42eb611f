//! Reaction entities - kinds, per-kind counts, and reactor rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::EntityRef;

/// The six mutually exclusive reactions a user may hold on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Love,
    Laugh,
    Angry,
    Sad,
    Fire,
}

impl ReactionKind {
    /// All kinds in display order
    pub const ALL: [ReactionKind; 6] = [
        Self::Like,
        Self::Love,
        Self::Laugh,
        Self::Angry,
        Self::Sad,
        Self::Fire,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Laugh => "laugh",
            Self::Angry => "angry",
            Self::Sad => "sad",
            Self::Fire => "fire",
        }
    }

    /// Badge shown by pickers and summaries
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Like => "👍",
            Self::Love => "❤️",
            Self::Laugh => "😂",
            Self::Angry => "😠",
            Self::Sad => "😢",
            Self::Fire => "🔥",
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = UnknownReactionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownReactionKind(s.to_string()))
    }
}

/// Error when parsing a ReactionKind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reaction kind: {0}")]
pub struct UnknownReactionKind(pub String);

/// Count per reaction kind.
///
/// Every kind is always present (missing kinds deserialize as zero) and no
/// count can go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionCounts {
    like: u64,
    love: u64,
    laugh: u64,
    angry: u64,
    sad: u64,
    fire: u64,
}

impl ReactionCounts {
    /// All-zero counts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts from `(kind, count)` pairs; later pairs win
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ReactionKind, u64)>) -> Self {
        let mut counts = Self::new();
        for (kind, count) in pairs {
            counts.set(kind, count);
        }
        counts
    }

    /// Legacy single-reaction shape: only `like` is populated
    #[must_use]
    pub fn only_likes(count: u64) -> Self {
        Self {
            like: count,
            ..Self::default()
        }
    }

    fn slots(&self) -> [u64; 6] {
        [self.like, self.love, self.laugh, self.angry, self.sad, self.fire]
    }

    fn slot_mut(&mut self, kind: ReactionKind) -> &mut u64 {
        match kind {
            ReactionKind::Like => &mut self.like,
            ReactionKind::Love => &mut self.love,
            ReactionKind::Laugh => &mut self.laugh,
            ReactionKind::Angry => &mut self.angry,
            ReactionKind::Sad => &mut self.sad,
            ReactionKind::Fire => &mut self.fire,
        }
    }

    /// Count for one kind
    #[must_use]
    pub fn get(&self, kind: ReactionKind) -> u64 {
        self.slots()[kind.index()]
    }

    /// Overwrite the count for one kind
    pub fn set(&mut self, kind: ReactionKind, count: u64) {
        *self.slot_mut(kind) = count;
    }

    /// Add one reaction of `kind`
    pub fn increment(&mut self, kind: ReactionKind) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(1);
    }

    /// Remove one reaction of `kind`, flooring at zero
    pub fn decrement(&mut self, kind: ReactionKind) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_sub(1);
    }

    /// Total reactions across all kinds
    #[must_use]
    pub fn total(&self) -> u64 {
        self.slots().iter().sum()
    }

    /// True when no kind has a reaction
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate `(kind, count)` in declaration order, zeros included
    pub fn iter(&self) -> impl Iterator<Item = (ReactionKind, u64)> + '_ {
        ReactionKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// The `n` most frequent non-zero kinds, ties broken by declaration order
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<(ReactionKind, u64)> {
        let mut ranked: Vec<_> = self.iter().filter(|(_, count)| *count > 0).collect();
        // stable sort keeps declaration order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// The signed-in user's own reaction to one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReactionState {
    pub entity: EntityRef,
    pub current_reaction: Option<ReactionKind>,
}

impl UserReactionState {
    /// State with no reaction held
    pub fn none(entity: EntityRef) -> Self {
        Self {
            entity,
            current_reaction: None,
        }
    }
}

/// Result of checking an entity's reactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReactionCheck {
    pub user_reaction: Option<ReactionKind>,
    pub counts: ReactionCounts,
}

/// One row of the "who reacted" list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reactor {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(alias = "reactionType")]
    pub reaction_kind: ReactionKind,
    #[serde(alias = "createdAt")]
    pub reacted_at: DateTime<Utc>,
}
