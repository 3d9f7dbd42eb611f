//! # adda-engagement
//!
//! Engagement core: the reaction store with optimistic updates and rollback,
//! the in-process event bus, and the headless view-models (reaction control,
//! reaction summary, comment thread, save toggle) a renderer draws from.

pub mod bus;
pub mod collaborators;
pub mod comments;
pub mod context;
pub mod control;
mod reactors;
pub mod saves;
pub mod store;
pub mod summary;

pub use bus::{EngagementEventBus, Subscription};
pub use collaborators::{NoopRewards, StaticIdentity, TracingNotifier};
pub use comments::CommentThread;
pub use context::{EngagementContext, EngagementContextBuilder};
pub use control::{ControlView, PickerOption, ReactionControl};
pub use reactors::ReactorsState;
pub use saves::{SaveOutcome, SaveToggle};
pub use store::{EntrySnapshot, Phase, ReactionStore, ToggleOutcome};
pub use summary::{Badge, ReactionSummary, SummaryView};
