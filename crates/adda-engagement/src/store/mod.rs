//! Client-side reaction state

mod reaction_store;
mod state;

pub use reaction_store::{ReactionStore, ToggleOutcome};
pub use state::{apply_optimistic, apply_snapshot, Confirmed, EntrySnapshot, EntryState, OptimisticDelta, Phase};
