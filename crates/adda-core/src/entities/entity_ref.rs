//! EntityRef - the (kind, id) key identifying an engageable object

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of engageable object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Post,
    Meme,
}

impl EntityKind {
    /// Wire name used in query strings and request bodies
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Meme => "meme",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = EntityRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "meme" => Ok(Self::Meme),
            other => Err(EntityRefParseError::UnknownKind(other.to_string())),
        }
    }
}

/// Immutable key for all per-entity engagement state.
///
/// Two refs are the same entity when both kind and id match; identity of the
/// value itself is never significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    /// Create a new EntityRef
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Reference to a feed post
    pub fn post(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Post, id)
    }

    /// Reference to a meme
    pub fn meme(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Meme, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for EntityRef {
    type Err = EntityRefParseError;

    /// Parse the `kind:id` form produced by `Display`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| EntityRefParseError::InvalidFormat(s.to_string()))?;
        if id.is_empty() {
            return Err(EntityRefParseError::EmptyId);
        }
        Ok(Self::new(kind.parse()?, id))
    }
}

/// Error when parsing an EntityRef from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityRefParseError {
    #[error("expected <kind>:<id>, got {0:?}")]
    InvalidFormat(String),

    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("entity id is empty")]
    EmptyId,
}
