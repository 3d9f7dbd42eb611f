//! Reaction control - interactive view-model for one entity
//!
//! Owns the picker and reactors panel; reaction state itself lives in the
//! [`ReactionStore`](crate::store::ReactionStore) and reaches the control
//! through the bus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use adda_core::{
    DomainResult, EntityRef, NotifyLevel, ReactionCounts, ReactionKind, Reactor, RewardEvent,
};
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::bus::Subscription;
use crate::context::EngagementContext;
use crate::reactors::{ReactorsPanel, ReactorsState};
use crate::store::ToggleOutcome;

/// One entry of the reaction picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerOption {
    pub kind: ReactionKind,
    pub emoji: &'static str,
    pub active: bool,
}

/// Everything a renderer needs to draw the control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub entity: EntityRef,
    pub counts: ReactionCounts,
    pub active: Option<ReactionKind>,
    pub picker_open: bool,
    pub reactors: ReactorsState,
}

#[derive(Debug, Default)]
struct ViewState {
    counts: ReactionCounts,
    active: Option<ReactionKind>,
    picker_open: bool,
}

/// Reaction button, picker and "who reacted" list bound to one entity
pub struct ReactionControl {
    ctx: EngagementContext,
    entity: EntityRef,
    view: Arc<Mutex<ViewState>>,
    mounted: Arc<AtomicBool>,
    reactors: ReactorsPanel,
    subscription: Mutex<Option<Subscription>>,
}

impl ReactionControl {
    /// Subscribe to the entity's events and load its state.
    ///
    /// A failed load leaves the neutral view and is only logged.
    #[instrument(skip(ctx, entity), fields(entity = %entity))]
    pub async fn mount(ctx: &EngagementContext, entity: EntityRef) -> Self {
        let store = Arc::clone(ctx.store());
        store.retain(&entity);
        let view = Arc::new(Mutex::new(ViewState {
            counts: store.counts(&entity),
            active: store.current_reaction(&entity),
            picker_open: false,
        }));
        let mounted = Arc::new(AtomicBool::new(true));

        let subscription = {
            let view = Arc::clone(&view);
            let mounted = Arc::clone(&mounted);
            let entity = entity.clone();
            ctx.bus().subscribe_entity(entity.clone(), move |event| {
                if !mounted.load(Ordering::Acquire) {
                    return;
                }
                let active = store.current_reaction(&entity);
                let mut view = view.lock();
                view.counts = event.counts;
                view.active = active;
            })
        };

        let control = Self {
            ctx: ctx.clone(),
            entity,
            view,
            mounted,
            reactors: ReactorsPanel::default(),
            subscription: Mutex::new(Some(subscription)),
        };

        if let Err(e) = control.ctx.store().load(&control.entity).await {
            warn!(error = %e, "Initial reaction load failed");
        }
        control
    }

    /// The entity this control is bound to
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    /// Check if the control is still mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    // === Picker ===

    pub fn open_picker(&self) {
        self.view.lock().picker_open = true;
    }

    pub fn close_picker(&self) {
        self.view.lock().picker_open = false;
    }

    /// All six kinds in display order with the held one flagged
    pub fn picker_options(&self) -> Vec<PickerOption> {
        let active = self.view.lock().active;
        ReactionKind::ALL
            .iter()
            .map(|&kind| PickerOption {
                kind,
                emoji: kind.emoji(),
                active: active == Some(kind),
            })
            .collect()
    }

    /// Pick a kind from the picker; picking the held kind removes it
    pub async fn select(&self, kind: ReactionKind) -> DomainResult<ToggleOutcome> {
        self.close_picker();
        self.toggle(kind).await
    }

    /// Primary button: like when nothing is held, otherwise remove the held reaction
    pub async fn press(&self) -> DomainResult<ToggleOutcome> {
        let kind = self
            .ctx
            .store()
            .current_reaction(&self.entity)
            .unwrap_or(ReactionKind::Like);
        self.toggle(kind).await
    }

    #[instrument(skip(self), fields(entity = %self.entity))]
    async fn toggle(&self, kind: ReactionKind) -> DomainResult<ToggleOutcome> {
        if !self.ctx.is_signed_in() {
            debug!("Toggle while signed out");
            self.ctx.identity().prompt_sign_in();
            return Ok(ToggleOutcome::SignInRequired);
        }

        match self.ctx.store().toggle(&self.entity, kind).await {
            Ok(outcome) => {
                if outcome.added() {
                    self.ctx.spawn_reward(RewardEvent::Reaction, &self.entity);
                }
                Ok(outcome)
            }
            Err(e) => {
                if e.is_auth() {
                    self.ctx.identity().prompt_sign_in();
                }
                self.ctx.notifier().notify(NotifyLevel::Error, &e.user_message());
                Err(e)
            }
        }
    }

    // === Reactors ===

    /// Fetch and show who reacted; fetched fresh on every open
    pub async fn open_reactors(&self) -> DomainResult<Vec<Reactor>> {
        self.reactors.open(self.ctx.api(), &self.entity).await
    }

    pub fn close_reactors(&self) {
        self.reactors.close();
    }

    /// Snapshot for rendering
    pub fn view(&self) -> ControlView {
        let view = self.view.lock();
        ControlView {
            entity: self.entity.clone(),
            counts: view.counts,
            active: view.active,
            picker_open: view.picker_open,
            reactors: self.reactors.state(),
        }
    }

    /// Stop listening for events; idempotent
    pub fn unmount(&self) {
        if self.mounted.swap(false, Ordering::AcqRel) {
            self.ctx.store().release(&self.entity);
            debug!(entity = %self.entity, "Reaction control unmounted");
        }
        self.subscription.lock().take();
        self.reactors.close();
    }
}

impl Drop for ReactionControl {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for ReactionControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionControl")
            .field("entity", &self.entity)
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}
