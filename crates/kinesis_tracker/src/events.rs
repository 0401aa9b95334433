//! Presence events

use kinesis_core::TrackingId;
use serde::{Deserialize, Serialize};

/// Type of presence event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceEventKind {
    /// A body appeared in a previously empty slot
    Enter,
    /// A slot's body stopped being tracked
    Exit,
}

/// A body as last seen by the tracker.
///
/// For exits this is the retained record from the slot's occupied span;
/// the frame that triggered the exit no longer knows this identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedBody {
    /// Slot index in the device's body register
    pub slot: usize,
    /// Device-assigned identifier
    pub id: TrackingId,
    /// Last reported reference position
    pub position: [f32; 3],
    /// Tick at which the body entered its slot
    pub entered_tick: u64,
}

/// A presence event
#[derive(Debug, Clone)]
pub struct PresenceEvent {
    /// Type of event
    pub kind: PresenceEventKind,
    /// The body that entered or exited
    pub body: TrackedBody,
    /// Tick the event was observed on
    pub tick: u64,
    /// Ticks the body spent in its slot (0 for Enter)
    pub ticks_present: u64,
}

impl PresenceEvent {
    /// Create an enter event
    pub fn enter(body: TrackedBody, tick: u64) -> Self {
        Self {
            kind: PresenceEventKind::Enter,
            body,
            tick,
            ticks_present: 0,
        }
    }

    /// Create an exit event
    pub fn exit(body: TrackedBody, tick: u64, ticks_present: u64) -> Self {
        Self {
            kind: PresenceEventKind::Exit,
            body,
            tick,
            ticks_present,
        }
    }

    /// Check if this is an enter event
    pub fn is_enter(&self) -> bool {
        self.kind == PresenceEventKind::Enter
    }

    /// Check if this is an exit event
    pub fn is_exit(&self) -> bool {
        self.kind == PresenceEventKind::Exit
    }
}

/// Callback type for presence events
pub type PresenceCallback = Box<dyn Fn(&PresenceEvent) + Send + Sync>;

/// Builder for presence event callbacks
pub struct PresenceHandler {
    /// Callback for enter events
    pub on_enter: Option<PresenceCallback>,
    /// Callback for exit events
    pub on_exit: Option<PresenceCallback>,
}

impl PresenceHandler {
    /// Create a new empty handler
    pub fn new() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
        }
    }

    /// Set enter callback
    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: Fn(&PresenceEvent) + Send + Sync + 'static,
    {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Set exit callback
    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&PresenceEvent) + Send + Sync + 'static,
    {
        self.on_exit = Some(Box::new(f));
        self
    }

    /// Handle an event
    pub fn handle(&self, event: &PresenceEvent) {
        match event.kind {
            PresenceEventKind::Enter => {
                if let Some(ref callback) = self.on_enter {
                    callback(event);
                }
            }
            PresenceEventKind::Exit => {
                if let Some(ref callback) = self.on_exit {
                    callback(event);
                }
            }
        }
    }
}

impl Default for PresenceHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn body(slot: usize, id: u64) -> TrackedBody {
        TrackedBody {
            slot,
            id: TrackingId::new(id),
            position: [0.0, 0.0, 0.0],
            entered_tick: 1,
        }
    }

    #[test]
    fn test_event_creation() {
        let event = PresenceEvent::enter(body(0, 5), 1);
        assert!(event.is_enter());
        assert_eq!(event.body.slot, 0);
        assert_eq!(event.ticks_present, 0);

        let event = PresenceEvent::exit(body(0, 5), 4, 3);
        assert!(event.is_exit());
        assert_eq!(event.ticks_present, 3);
    }

    #[test]
    fn test_handler_callbacks() {
        let enter_count = Arc::new(AtomicU32::new(0));
        let exit_count = Arc::new(AtomicU32::new(0));

        let enter_count_clone = enter_count.clone();
        let exit_count_clone = exit_count.clone();

        let handler = PresenceHandler::new()
            .on_enter(move |_| {
                enter_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .on_exit(move |_| {
                exit_count_clone.fetch_add(1, Ordering::SeqCst);
            });

        handler.handle(&PresenceEvent::enter(body(0, 5), 1));
        handler.handle(&PresenceEvent::enter(body(1, 7), 2));
        handler.handle(&PresenceEvent::exit(body(0, 5), 3, 2));

        assert_eq!(enter_count.load(Ordering::SeqCst), 2);
        assert_eq!(exit_count.load(Ordering::SeqCst), 1);
    }
}
