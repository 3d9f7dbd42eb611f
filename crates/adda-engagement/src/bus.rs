//! Engagement event bus
//!
//! In-process fan-out of [`ReactionEvent`]s so every mounted view of an
//! entity sees count changes made through any other view. No persistence,
//! no cross-process delivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use adda_core::{EntityRef, ReactionEvent};
use parking_lot::Mutex;

type Handler = Arc<dyn Fn(&ReactionEvent) + Send + Sync>;

struct Slot {
    id: u64,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    slots: Mutex<Vec<Slot>>,
    next_id: AtomicU64,
}

impl BusInner {
    fn remove(&self, id: u64) -> bool {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        slots.len() != before
    }
}

/// Publish/subscribe channel for reaction count changes.
///
/// Handlers run synchronously, in subscription order, on the publishing task.
/// The handler list is snapshotted before delivery and the lock is released
/// while handlers run, so a handler may publish, subscribe or unsubscribe
/// (itself or a sibling) without deadlocking or skipping anyone.
#[derive(Clone, Default)]
pub struct EngagementEventBus {
    inner: Arc<BusInner>,
}

impl EngagementEventBus {
    /// Create an empty bus
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every event
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ReactionEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.slots.lock().push(Slot {
            id,
            handler: Arc::new(handler),
        });

        tracing::trace!(subscription_id = id, "Bus subscription added");

        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
            active: true,
        }
    }

    /// Register a handler for events about one entity (matched by value)
    pub fn subscribe_entity<F>(&self, entity: EntityRef, handler: F) -> Subscription
    where
        F: Fn(&ReactionEvent) + Send + Sync + 'static,
    {
        self.subscribe(move |event| {
            if event.is_for(&entity) {
                handler(event);
            }
        })
    }

    /// Deliver an event to every current subscriber; returns how many were called
    pub fn publish(&self, event: &ReactionEvent) -> usize {
        let handlers: Vec<Handler> = self
            .inner
            .slots
            .lock()
            .iter()
            .map(|slot| Arc::clone(&slot.handler))
            .collect();

        tracing::trace!(
            entity = %event.entity,
            source = ?event.source,
            total = event.counts.total(),
            subscribers = handlers.len(),
            "Publishing reaction event"
        );

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.slots.lock().len()
    }
}

/// Handle to a bus registration; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Remove the handler; calling this more than once is a no-op
    pub fn unsubscribe(&mut self) {
        if !std::mem::take(&mut self.active) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            if bus.remove(self.id) {
                tracing::trace!(subscription_id = self.id, "Bus subscription removed");
            }
        }
    }

    /// Check if the handler is still registered
    pub fn is_active(&self) -> bool {
        self.active && self.bus.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
