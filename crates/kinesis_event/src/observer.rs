//! Observer registration and dispatch

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Boxed event callback
pub type EventHandler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Set of observers notified in subscription order.
///
/// Interior mutability so dispatch only needs `&self`; producers and
/// subscribers can share the set behind an `Arc`.
pub struct ObserverSet<E> {
    handlers: RwLock<Vec<(SubscriberId, EventHandler<E>)>>,
    next_subscriber_id: AtomicU64,
}

impl<E> ObserverSet<E> {
    /// Create an empty observer set
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Subscribe a callback, returning an ID for later removal
    pub fn subscribe<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Box::new(handler)));
        id
    }

    /// Unsubscribe; returns false if the ID was unknown
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(sub_id, _)| *sub_id != id);
        handlers.len() != before
    }

    /// Notify every observer, in subscription order
    pub fn notify(&self, event: &E) {
        for (_, handler) in self.handlers.read().iter() {
            handler(event);
        }
    }

    /// Get observer count
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Check if no observers are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

impl<E> Default for ObserverSet<E> {
    fn default() -> Self {
        Self::new()
    }
}
