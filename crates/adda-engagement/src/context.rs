//! Engagement context - dependency container for view-models
//!
//! Holds the API port, the collaborators, the shared bus and store, and the
//! settings every view-model reads.

use std::sync::Arc;

use adda_common::EngagementSettings;
use adda_core::{
    DomainError, DomainResult, EngagementApi, EntityRef, IdentityProvider, Notifier, RewardEvent,
    RewardTrigger,
};
use tracing::{debug, warn};

use crate::bus::EngagementEventBus;
use crate::collaborators::{NoopRewards, TracingNotifier};
use crate::store::ReactionStore;

/// Engagement context shared by every mounted view-model
///
/// Cloning is cheap; clones share the bus and the store.
#[derive(Clone)]
pub struct EngagementContext {
    api: Arc<dyn EngagementApi>,
    identity: Arc<dyn IdentityProvider>,
    rewards: Arc<dyn RewardTrigger>,
    notifier: Arc<dyn Notifier>,
    bus: EngagementEventBus,
    store: Arc<ReactionStore>,
    settings: EngagementSettings,
}

impl EngagementContext {
    /// Start building a context
    pub fn builder() -> EngagementContextBuilder {
        EngagementContextBuilder::new()
    }

    /// Get the engagement API
    pub fn api(&self) -> &dyn EngagementApi {
        self.api.as_ref()
    }

    /// Get the identity provider
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    /// Get the notifier
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Get the event bus
    pub fn bus(&self) -> &EngagementEventBus {
        &self.bus
    }

    /// Get the reaction store
    pub fn store(&self) -> &Arc<ReactionStore> {
        &self.store
    }

    /// Get the view-model settings
    pub fn settings(&self) -> &EngagementSettings {
        &self.settings
    }

    /// Check if a user is signed in right now
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_signed_in()
    }

    /// Fire-and-forget reward; failures are logged and otherwise ignored
    pub fn spawn_reward(&self, event: RewardEvent, entity: &EntityRef) {
        let rewards = Arc::clone(&self.rewards);
        let entity = entity.clone();
        tokio::spawn(async move {
            match rewards.trigger_reward(event, &entity).await {
                Ok(()) => debug!(event = event.as_str(), entity = %entity, "Reward triggered"),
                Err(e) => warn!(event = event.as_str(), entity = %entity, error = %e, "Reward failed"),
            }
        });
    }
}

impl std::fmt::Debug for EngagementContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementContext")
            .field("api", &"EngagementApi")
            .field("collaborators", &"...")
            .field("subscribers", &self.bus.subscriber_count())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating an EngagementContext
pub struct EngagementContextBuilder {
    api: Option<Arc<dyn EngagementApi>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    rewards: Option<Arc<dyn RewardTrigger>>,
    notifier: Option<Arc<dyn Notifier>>,
    bus: Option<EngagementEventBus>,
    settings: EngagementSettings,
}

impl EngagementContextBuilder {
    pub fn new() -> Self {
        Self {
            api: None,
            identity: None,
            rewards: None,
            notifier: None,
            bus: None,
            settings: EngagementSettings::default(),
        }
    }

    pub fn api(mut self, api: Arc<dyn EngagementApi>) -> Self {
        self.api = Some(api);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn rewards(mut self, rewards: Arc<dyn RewardTrigger>) -> Self {
        self.rewards = Some(rewards);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn bus(mut self, bus: EngagementEventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn settings(mut self, settings: EngagementSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the EngagementContext
    ///
    /// # Errors
    /// Returns `DomainError::Internal` if the API or the identity provider is missing
    pub fn build(self) -> DomainResult<EngagementContext> {
        let api = self
            .api
            .ok_or_else(|| DomainError::Internal("api is required".to_string()))?;
        let identity = self
            .identity
            .ok_or_else(|| DomainError::Internal("identity is required".to_string()))?;
        let bus = self.bus.unwrap_or_default();
        let store = Arc::new(ReactionStore::new(Arc::clone(&api), bus.clone()));

        Ok(EngagementContext {
            api,
            identity,
            rewards: self.rewards.unwrap_or_else(|| Arc::new(NoopRewards)),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            bus,
            store,
            settings: self.settings,
        })
    }
}

impl Default for EngagementContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
