//! Reaction summary - read-only badges with background polling

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adda_core::{DomainResult, EntityRef, ReactionCounts, ReactionKind, Reactor};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::bus::Subscription;
use crate::context::EngagementContext;
use crate::reactors::{ReactorsPanel, ReactorsState};

/// One reaction badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub kind: ReactionKind,
    pub emoji: &'static str,
    pub count: u64,
}

/// What the summary draws when there is anything to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    /// Most frequent kinds, highest first
    pub badges: Vec<Badge>,
    pub total: u64,
}

impl SummaryView {
    /// Build the view, `None` when nobody reacted
    #[must_use]
    pub fn from_counts(counts: &ReactionCounts, top_n: usize) -> Option<Self> {
        let total = counts.total();
        if total == 0 {
            return None;
        }
        let badges = counts
            .top(top_n)
            .into_iter()
            .map(|(kind, count)| Badge {
                kind,
                emoji: kind.emoji(),
                count,
            })
            .collect();
        Some(Self { badges, total })
    }
}

/// Background poll task; stopped on drop
struct Poller {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Poller {
    fn spawn(ctx: EngagementContext, entity: EntityRef, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(poll_loop(ctx, entity, period, shutdown_rx));
        Self {
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

async fn poll_loop(
    ctx: EngagementContext,
    entity: EntityRef,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(entity = %entity, period_ms = period.as_millis(), "Reaction polling started");

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if !ctx.is_signed_in() {
                    trace!(entity = %entity, "Skipping poll while signed out");
                    continue;
                }
                if let Err(e) = ctx.store().refresh(&entity).await {
                    warn!(entity = %entity, error = %e, transient = e.is_transient(), "Reaction poll failed");
                }
            }
        }
    }

    info!(entity = %entity, "Reaction polling stopped");
}

/// Read-only reaction badges for one entity.
///
/// Counts arrive through the bus; a poller re-fetches authoritative counts
/// on a fixed interval while the user is signed in.
pub struct ReactionSummary {
    ctx: EngagementContext,
    entity: EntityRef,
    counts: Arc<Mutex<ReactionCounts>>,
    mounted: Arc<AtomicBool>,
    reactors: ReactorsPanel,
    subscription: Mutex<Option<Subscription>>,
    poller: Mutex<Option<Poller>>,
}

impl ReactionSummary {
    /// Seed from the store, subscribe, and start polling.
    ///
    /// Must be called inside a tokio runtime.
    pub fn mount(ctx: &EngagementContext, entity: EntityRef) -> Self {
        ctx.store().retain(&entity);
        let counts = Arc::new(Mutex::new(ctx.store().counts(&entity)));
        let mounted = Arc::new(AtomicBool::new(true));

        let subscription = {
            let counts = Arc::clone(&counts);
            let mounted = Arc::clone(&mounted);
            ctx.bus().subscribe_entity(entity.clone(), move |event| {
                if mounted.load(Ordering::Acquire) {
                    *counts.lock() = event.counts;
                }
            })
        };

        let poller = Poller::spawn(ctx.clone(), entity.clone(), ctx.settings().poll_interval);

        Self {
            ctx: ctx.clone(),
            entity,
            counts,
            mounted,
            reactors: ReactorsPanel::default(),
            subscription: Mutex::new(Some(subscription)),
            poller: Mutex::new(Some(poller)),
        }
    }

    /// The entity this summary is bound to
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    /// Latest counts seen
    pub fn counts(&self) -> ReactionCounts {
        *self.counts.lock()
    }

    /// Top-N badges and the total; `None` when nobody reacted
    pub fn render(&self) -> Option<SummaryView> {
        SummaryView::from_counts(&self.counts(), self.ctx.settings().summary_top_n)
    }

    /// Check if the background poller is alive
    pub fn is_polling(&self) -> bool {
        self.poller.lock().as_ref().is_some_and(Poller::is_running)
    }

    /// Fetch and show who reacted
    pub async fn open_reactors(&self) -> DomainResult<Vec<Reactor>> {
        self.reactors.open(self.ctx.api(), &self.entity).await
    }

    pub fn close_reactors(&self) {
        self.reactors.close();
    }

    pub fn reactors(&self) -> ReactorsState {
        self.reactors.state()
    }

    /// Stop polling and listening; idempotent
    pub fn unmount(&self) {
        self.poller.lock().take();
        if self.mounted.swap(false, Ordering::AcqRel) {
            self.ctx.store().release(&self.entity);
            debug!(entity = %self.entity, "Reaction summary unmounted");
        }
        self.subscription.lock().take();
        self.reactors.close();
    }
}

impl Drop for ReactionSummary {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for ReactionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionSummary")
            .field("entity", &self.entity)
            .field("counts", &self.counts())
            .field("polling", &self.is_polling())
            .finish_non_exhaustive()
    }
}
