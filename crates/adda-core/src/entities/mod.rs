//! Domain entities - engagement objects

mod comment;
mod entity_ref;
mod reaction;

pub use comment::{Comment, CommentAuthor, CommentDraft, CommentId, MAX_COMMENT_LENGTH};
pub use entity_ref::{EntityKind, EntityRef, EntityRefParseError};
pub use reaction::{
    ReactionCheck, ReactionCounts, ReactionKind, Reactor, UnknownReactionKind, UserReactionState,
};
