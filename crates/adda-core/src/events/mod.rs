//! Domain events - notifications emitted when engagement state changes

mod reaction_event;

pub use reaction_event::{ReactionEvent, ReactionEventSource};
