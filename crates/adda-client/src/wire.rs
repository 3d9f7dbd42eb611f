//! Wire DTOs and response-shape normalization
//!
//! The API has grown several response shapes over time. All of them are
//! accepted here and converted to the canonical domain types; nothing outside
//! this module looks at raw JSON.

use adda_core::{
    Comment, CommentAuthor, CommentId, DomainError, DomainResult, EntityKind, EntityRef,
    ReactionCheck, ReactionCounts, ReactionKind, Reactor,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Requests
// ============================================================================

/// Body of add-reaction / remove-reaction
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest<'a> {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub id: &'a str,
    /// Serialized as `null` on removal
    pub reaction_type: Option<ReactionKind>,
}

impl<'a> ReactionRequest<'a> {
    pub fn new(entity: &'a EntityRef, reaction: Option<ReactionKind>) -> Self {
        Self {
            kind: entity.kind,
            id: &entity.id,
            reaction_type: reaction,
        }
    }
}

/// Body of add-like / remove-like
#[derive(Debug, Serialize)]
pub struct LikeRequest<'a> {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub id: &'a str,
}

impl<'a> LikeRequest<'a> {
    pub fn new(entity: &'a EntityRef) -> Self {
        Self {
            kind: entity.kind,
            id: &entity.id,
        }
    }
}

/// Body of comment creation; exactly one of the ids is set
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meme_id: Option<&'a str>,
    pub content: &'a str,
}

impl<'a> CommentRequest<'a> {
    pub fn new(entity: &'a EntityRef, content: &'a str) -> Self {
        let (post_id, meme_id) = match entity.kind {
            EntityKind::Post => (Some(entity.id.as_str()), None),
            EntityKind::Meme => (None, Some(entity.id.as_str())),
        };
        Self {
            post_id,
            meme_id,
            content,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// check-reaction response in either the current or the legacy shape
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CheckReactionResponse {
    #[serde(rename_all = "camelCase")]
    Reactions {
        #[serde(default)]
        user_reaction: Option<String>,
        reaction_counts: ReactionCounts,
    },
    #[serde(rename_all = "camelCase")]
    Legacy { liked: bool, like_count: u64 },
}

impl From<CheckReactionResponse> for ReactionCheck {
    fn from(response: CheckReactionResponse) -> Self {
        match response {
            CheckReactionResponse::Reactions {
                user_reaction,
                reaction_counts,
            } => Self {
                // unknown or empty kinds from the server mean "no reaction"
                user_reaction: user_reaction.and_then(|s| s.parse().ok()),
                counts: reaction_counts,
            },
            CheckReactionResponse::Legacy { liked, like_count } => Self {
                user_reaction: liked.then_some(ReactionKind::Like),
                counts: ReactionCounts::only_likes(like_count),
            },
        }
    }
}

/// add/remove-reaction response; counts are optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionMutationResponse {
    #[serde(default)]
    pub reaction_counts: Option<ReactionCounts>,
}

/// add/remove-like response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeMutationResponse {
    #[serde(default)]
    pub like_count: Option<u64>,
}

/// get-reactions response
#[derive(Debug, Deserialize)]
pub struct ReactorsResponse {
    #[serde(default)]
    pub reactions: Vec<Reactor>,
}

/// `{ data: T }` envelope used by comment endpoints
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Comment as sent by the server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "body")]
    pub content: String,
    #[serde(default, alias = "user")]
    pub author: Option<CommentAuthor>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CommentDto> for Comment {
    fn from(dto: CommentDto) -> Self {
        Self {
            id: CommentId::Server(dto.id),
            author: dto.author.unwrap_or_default(),
            body: dto.content,
            created_at: dto.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Error body; `message` is used when present
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

/// Decode a 2xx body, mapping shape mismatches to `DomainError::Decode`
pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> DomainResult<T> {
    // some endpoints answer 2xx with an empty body
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| DomainError::Decode(e.to_string()))
}

/// Single adapter from any check-reaction shape to the canonical type
pub fn normalize_check(bytes: &[u8]) -> DomainResult<ReactionCheck> {
    decode::<CheckReactionResponse>(bytes).map(ReactionCheck::from)
}
