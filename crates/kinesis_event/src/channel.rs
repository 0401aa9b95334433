//! Pollable event queue

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Queue of events that interested parties poll.
///
/// FIFO and unbounded; the sending half can be cloned out and handed to
/// producers on other threads.
pub struct EventChannel<E> {
    sender: Sender<E>,
    receiver: Receiver<E>,
}

impl<E> EventChannel<E> {
    /// Create a new channel
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Send an event
    pub fn send(&self, event: E) {
        // The receiving half lives as long as self, so this cannot fail
        let _ = self.sender.send(event);
    }

    /// Get a cloneable sending handle for producers
    pub fn sender(&self) -> Sender<E> {
        self.sender.clone()
    }

    /// Receive the next event, if any
    pub fn try_recv(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Drain all pending events
    pub fn drain(&self) -> Vec<E> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Get pending event count
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}
