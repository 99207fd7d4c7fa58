//! Publish/subscribe hub.
//!
//! [`Dispatcher`] is generic over the event type and over the context
//! handed to handlers. The session uses `Dispatcher<Event, dyn SessionControl>`
//! so every handler receives the session's command surface as an argument
//! instead of capturing it.
//!
//! # Ordering and reentrancy
//!
//! `publish` snapshots the subscribers of the event's topic under the lock,
//! drops `once` subscriptions from the table, releases the lock, and then
//! invokes the snapshot in subscription order. Handlers may therefore
//! subscribe, unsubscribe or publish again without deadlocking, and a `once`
//! handler that republishes its own event is not invoked a second time.
//!
//! # Failures
//!
//! A handler that returns `Err` or panics does not stop the remaining
//! handlers. Each failure is returned from `publish` as a [`HandlerFailure`]
//! for the caller to report.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{Event, EventKind};

/// Events that can be routed by a topic key.
pub trait Topic {
    /// Subscription key type.
    type Kind: Copy + Eq + Hash + Debug;

    /// Key this event is published under.
    fn topic(&self) -> Self::Kind;
}

impl Topic for Event {
    type Kind = EventKind;

    fn topic(&self) -> EventKind {
        self.kind()
    }
}

/// Shared handler callable with a context and an event.
pub type Handler<E, C> = Arc<dyn Fn(&C, &E) -> anyhow::Result<()> + Send + Sync>;

/// Wrap a closure as a [`Handler`].
///
/// Going through this function lets the closure's argument and return
/// types be inferred from the handler signature.
pub fn handler<E, C, F>(f: F) -> Handler<E, C>
where
    C: ?Sized,
    F: Fn(&C, &E) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identifies one subscription; returned by `subscribe` and accepted by
/// `unsubscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// How long a subscription lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Until unsubscribed.
    Persistent,
    /// Removed right before its first invocation.
    Once,
}

/// A handler that failed during `publish`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerFailure<K> {
    /// Subscription that failed.
    pub id: SubscriptionId,
    /// Topic being published.
    pub topic: K,
    /// Error or panic message.
    pub message: String,
}

struct Subscription<E, C: ?Sized> {
    id: SubscriptionId,
    mode: Mode,
    handler: Handler<E, C>,
}

/// Topic-keyed subscriber table.
pub struct Dispatcher<E: Topic, C: ?Sized> {
    subscriptions: Mutex<HashMap<E::Kind, Vec<Subscription<E, C>>>>,
    next_id: AtomicU64,
}

impl<E: Topic, C: ?Sized> Default for Dispatcher<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Topic, C: ?Sized> Dispatcher<E, C> {
    /// Create an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a persistent handler for `topic`.
    pub fn subscribe(&self, topic: E::Kind, handler: Handler<E, C>) -> SubscriptionId {
        self.insert(topic, Mode::Persistent, handler)
    }

    /// Register a handler that runs at most once.
    pub fn subscribe_once(&self, topic: E::Kind, handler: Handler<E, C>) -> SubscriptionId {
        self.insert(topic, Mode::Once, handler)
    }

    /// Remove a subscription. Returns false if it had already been removed
    /// or had fired in `once` mode.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut table = self.subscriptions.lock();
        for list in table.values_mut() {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of live subscriptions for `topic`.
    pub fn subscriber_count(&self, topic: E::Kind) -> usize {
        self.subscriptions.lock().get(&topic).map_or(0, Vec::len)
    }

    /// Invoke every handler subscribed to the event's topic.
    pub fn publish(&self, ctx: &C, event: &E) -> Vec<HandlerFailure<E::Kind>> {
        let topic = event.topic();
        let snapshot: Vec<(SubscriptionId, Handler<E, C>)> = {
            let mut table = self.subscriptions.lock();
            let Some(list) = table.get_mut(&topic) else {
                return Vec::new();
            };
            let snapshot = list
                .iter()
                .map(|s| (s.id, Arc::clone(&s.handler)))
                .collect();
            list.retain(|s| s.mode == Mode::Persistent);
            snapshot
        };

        let mut failures = Vec::new();
        for (id, handler) in snapshot {
            let message = match catch_unwind(AssertUnwindSafe(|| handler(ctx, event))) {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{err:#}"),
                Err(panic) => panic_message(panic.as_ref()),
            };
            failures.push(HandlerFailure { id, topic, message });
        }
        failures
    }

    fn insert(&self, topic: E::Kind, mode: Mode, handler: Handler<E, C>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .lock()
            .entry(topic)
            .or_default()
            .push(Subscription { id, mode, handler });
        id
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_owned()
    }
}
