//! Comment entities - server comments and optimistic drafts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use validator::{Validate, ValidationError};

use crate::error::DomainError;

/// Maximum comment length in characters
pub const MAX_COMMENT_LENGTH: u64 = 2000;

static NEXT_TEMPORARY_ID: AtomicU64 = AtomicU64::new(1);

/// Comment identifier: authoritative from the server, or a local placeholder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentId {
    Server(String),
    Temporary(u64),
}

impl CommentId {
    /// Allocate a fresh temporary id (process-wide, monotonically increasing)
    pub fn next_temporary() -> Self {
        Self::Temporary(NEXT_TEMPORARY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Check if this id was generated locally
    #[inline]
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => f.write_str(id),
            Self::Temporary(n) => write!(f, "temp-{n}"),
        }
    }
}

/// Who wrote a comment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}

impl CommentAuthor {
    /// Placeholder author for optimistic drafts when the identity is unknown
    pub fn anonymous() -> Self {
        Self {
            user_id: String::new(),
            name: "You".to_string(),
            picture_url: None,
        }
    }
}

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub author: CommentAuthor,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Check if this comment is still an optimistic placeholder
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.id.is_temporary()
    }
}

/// A validated comment body waiting to be sent
#[derive(Debug, Clone, Validate)]
pub struct CommentDraft {
    #[validate(
        custom(function = "not_blank"),
        length(max = 2000, message = "Comment must be at most 2000 characters")
    )]
    body: String,
}

fn not_blank(body: &str) -> Result<(), ValidationError> {
    if body.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Comment cannot be empty".into());
        return Err(err);
    }
    Ok(())
}

impl CommentDraft {
    /// Validate and trim a comment body
    pub fn new(body: impl AsRef<str>) -> Result<Self, DomainError> {
        let draft = Self {
            body: body.as_ref().trim().to_string(),
        };
        draft.validate()?;
        Ok(draft)
    }

    /// The trimmed body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Materialize the draft as a pending comment with a temporary id
    pub fn into_pending(self, author: CommentAuthor) -> Comment {
        Comment {
            id: CommentId::next_temporary(),
            author,
            body: self.body,
            created_at: Utc::now(),
        }
    }
}
