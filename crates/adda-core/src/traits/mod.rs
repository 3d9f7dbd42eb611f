//! Traits (ports) - what the engagement core needs from the outside world
//!
//! The core defines the interface; `adda-client` and the embedding
//! application provide implementations, and tests provide fakes.

mod collaborators;
mod engagement;

pub use collaborators::{IdentityProvider, Notifier, NotifyLevel, RewardEvent, RewardTrigger};
pub use engagement::EngagementApi;
