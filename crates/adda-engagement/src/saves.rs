//! Save toggle - optimistic saved/unsaved flag

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use adda_core::{DomainResult, EntityRef, NotifyLevel, RewardEvent};
use tracing::{debug, info, instrument, warn};

use crate::context::EngagementContext;

/// What became of a save toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Unsaved,
    /// A newer toggle was issued before this one finished
    Superseded,
    SignInRequired,
}

/// Bookmark flag for one entity
#[derive(Debug)]
pub struct SaveToggle {
    ctx: EngagementContext,
    entity: EntityRef,
    saved: AtomicBool,
    seq: AtomicU64,
}

impl SaveToggle {
    /// Bind to `entity` with the saved flag the feed reported
    pub fn new(ctx: &EngagementContext, entity: EntityRef, saved: bool) -> Self {
        Self {
            ctx: ctx.clone(),
            entity,
            saved: AtomicBool::new(saved),
            seq: AtomicU64::new(0),
        }
    }

    pub fn is_saved(&self) -> bool {
        self.saved.load(Ordering::Acquire)
    }

    /// Flip the flag, then confirm with the server; rolled back on failure
    #[instrument(skip(self), fields(entity = %self.entity))]
    pub async fn toggle(&self) -> DomainResult<SaveOutcome> {
        if !self.ctx.is_signed_in() {
            self.ctx.identity().prompt_sign_in();
            return Ok(SaveOutcome::SignInRequired);
        }

        let seq = self.seq.fetch_add(1, Ordering::AcqRel) + 1;
        let previous = self.saved.fetch_xor(true, Ordering::AcqRel);
        let next = !previous;

        let result = self.ctx.api().set_saved(&self.entity, next).await;
        let latest = self.seq.load(Ordering::Acquire) == seq;

        if !latest {
            debug!(seq, failed = result.is_err(), "Discarding superseded save response");
            return Ok(SaveOutcome::Superseded);
        }

        match result {
            Ok(()) => {
                info!(saved = next, "Save confirmed");
                let message = if next { "Saved" } else { "Removed from saved" };
                self.ctx.notifier().notify(NotifyLevel::Success, message);
                if next {
                    self.ctx.spawn_reward(RewardEvent::Save, &self.entity);
                }
                Ok(if next {
                    SaveOutcome::Saved
                } else {
                    SaveOutcome::Unsaved
                })
            }
            Err(e) => {
                self.saved.store(previous, Ordering::Release);
                warn!(error = %e, saved = previous, "Save failed, rolled back");
                if e.is_auth() {
                    self.ctx.identity().prompt_sign_in();
                }
                self.ctx.notifier().notify(NotifyLevel::Error, &e.user_message());
                Err(e)
            }
        }
    }
}
