//! Subscription registry and fan-out.
//!
//! This module provides thread-safe registration of entity subscriptions and
//! the dispatch path that fans a decoded frame out to every subscription
//! registered under the frame's entity key. Fan-out is sequential in
//! registration order and isolates subscribers from each other: one failing
//! or panicking callback never stops the rest from running.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use orbit_models::{EntityRef, EntityType, Payload};

use crate::handler::Handler;
use crate::hook::{DispatchHook, LogHook};

/// Unique identifier for one registered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Routing key for subscriptions: the entity kind plus the owning device id.
///
/// Frames on the feed are scoped per device, so all subscriptions for one
/// device's streams share a key and the adapter narrows further by name.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SubscriptionKey {
    pub entity_type: EntityType,
    pub entity_id: String,
}

impl SubscriptionKey {
    pub fn new(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
        }
    }

    /// The key a subscription for `entity` registers under.
    pub fn for_entity(entity: &EntityRef) -> Self {
        Self::new(entity.kind(), entity.device_id())
    }

    /// The key a decoded frame routes to.
    pub fn for_payload(payload: &Payload) -> Self {
        Self::new(payload.entity_type(), payload.entity_id())
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.entity_id)
    }
}

/// Proof of registration, required to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    pub key: SubscriptionKey,
}

struct Subscription {
    id: SubscriptionId,
    entity: EntityRef,
    handler: Handler,
}

/// Thread-safe subscription registry with sequential fan-out.
pub struct Dispatcher {
    /// Subscriptions grouped by routing key, in registration order.
    subscriptions: DashMap<SubscriptionKey, Vec<Arc<Subscription>>>,

    /// Atomic counter for generating unique subscription IDs.
    next_id: AtomicU64,

    /// Failure sink for handler errors, panics and undecodable frames.
    pub(crate) hook: Arc<dyn DispatchHook>,
}

impl Dispatcher {
    /// Create a dispatcher that reports failures through [`LogHook`].
    pub fn new() -> Self {
        Self::with_hook(Arc::new(LogHook))
    }

    /// Create a dispatcher with a custom failure sink.
    pub fn with_hook(hook: Arc<dyn DispatchHook>) -> Self {
        Self {
            subscriptions: DashMap::new(),
            next_id: AtomicU64::new(1),
            hook,
        }
    }

    /// Register `handler` for events on `entity`.
    ///
    /// Subscriptions on the same entity are independent; each gets its own
    /// handle and they are invoked in registration order.
    pub fn subscribe(&self, entity: EntityRef, handler: Handler) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let key = SubscriptionKey::for_entity(&entity);
        let subscription = Arc::new(Subscription {
            id,
            entity,
            handler,
        });

        self.subscriptions
            .entry(key.clone())
            .or_default()
            .push(subscription);

        tracing::debug!(%id, key = %key, "subscription registered");
        SubscriptionHandle { id, key }
    }

    /// Remove the subscription behind `handle`.
    ///
    /// Returns `true` when a subscription was removed, `false` when the
    /// handle was already spent. Unsubscribing twice is harmless.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let Some(mut entry) = self.subscriptions.get_mut(&handle.key) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|subscription| subscription.id != handle.id);
        let removed = entry.len() < before;
        let now_empty = entry.is_empty();
        drop(entry);

        if now_empty {
            // Re-check under the entry lock: a concurrent subscribe may have
            // repopulated the slot since we released it.
            self.subscriptions
                .remove_if(&handle.key, |_, subscriptions| subscriptions.is_empty());
        }

        if removed {
            tracing::debug!(id = %handle.id, key = %handle.key, "subscription removed");
        }
        removed
    }

    /// Fan `payload` out to every subscription under its routing key.
    ///
    /// The subscriber list is snapshotted up front: subscriptions added or
    /// removed while fan-out runs take effect from the next frame, and a
    /// subscription removed mid-frame still receives the current one.
    pub fn dispatch(&self, payload: &Payload) {
        let key = SubscriptionKey::for_payload(payload);
        let snapshot: Vec<Arc<Subscription>> = match self.subscriptions.get(&key) {
            Some(entry) => entry.value().clone(),
            None => return,
        };

        for subscription in snapshot {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                subscription.handler.deliver(&subscription.entity, payload)
            }));
            let result = match outcome {
                Ok(result) => result,
                Err(panic) => Err(panic_message(panic).into()),
            };
            if let Err(error) = result {
                self.hook.on_handler_error(&key, &error);
            }
        }
    }

    /// Total number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions
            .iter()
            .map(|entry| entry.value().len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every subscription at once.
    pub fn clear(&self) {
        self.subscriptions.clear();
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscriptions", &self.len())
            .finish()
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "subscriber panicked".to_string()
    }
}
