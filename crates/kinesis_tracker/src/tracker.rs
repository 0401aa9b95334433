//! Slot-diff presence tracker

use crate::events::{PresenceEvent, PresenceHandler, TrackedBody};
use kinesis_core::{BodySample, TrackingId};
use thiserror::Error;

/// Errors from the presence tracker
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// A frame arrived with the wrong slot count; the tick is rejected
    /// and the caller must reconfigure before resuming
    #[error("slot count mismatch: tracker holds {expected} slots, frame supplied {got}")]
    CapacityMismatch { expected: usize, got: usize },
}

/// Tracks which body occupies each slot of the device's body register,
/// emitting enter/exit events as occupancy changes tick over tick.
///
/// The tracker owns the only mutable state of the core: the per-slot
/// identifier snapshot from the previous tick, plus the retained body
/// record that backs exit events. Input frames are borrowed for the
/// duration of one [`diff`](PresenceTracker::diff) call and never kept.
pub struct PresenceTracker {
    /// Identifier seen per slot at the end of the previous tick
    snapshot: Vec<TrackingId>,
    /// Last-known body per slot, present while the slot is occupied
    bodies: Vec<Option<TrackedBody>>,
    /// Number of occupied slots, derived from enters and exits only
    occupied: usize,
    /// Ticks processed since construction or last reset
    tick: u64,
    /// Queue of events from the current tick
    event_queue: Vec<PresenceEvent>,
    /// Optional callbacks (not serialized)
    handler: Option<PresenceHandler>,
}

impl PresenceTracker {
    /// Create a tracker for a device reporting `capacity` body slots
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshot: vec![TrackingId::NONE; capacity],
            bodies: vec![None; capacity],
            occupied: 0,
            tick: 0,
            event_queue: Vec::new(),
            handler: None,
        }
    }

    /// Set event handler
    pub fn with_handler(mut self, handler: PresenceHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Set enter callback
    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: Fn(&PresenceEvent) + Send + Sync + 'static,
    {
        let handler = self.handler.take().unwrap_or_default();
        self.handler = Some(handler.on_enter(f));
        self
    }

    /// Set exit callback
    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&PresenceEvent) + Send + Sync + 'static,
    {
        let handler = self.handler.take().unwrap_or_default();
        self.handler = Some(handler.on_exit(f));
        self
    }

    /// Get the fixed slot capacity
    pub fn capacity(&self) -> usize {
        self.snapshot.len()
    }

    /// Get the number of occupied slots
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    /// Get the number of ticks processed
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Check whether a slot currently holds a body
    pub fn is_occupied(&self, slot: usize) -> bool {
        self.bodies.get(slot).is_some_and(|b| b.is_some())
    }

    /// Get the body in a slot, if any
    pub fn body_at(&self, slot: usize) -> Option<&TrackedBody> {
        self.bodies.get(slot).and_then(|b| b.as_ref())
    }

    /// Get the lowest-index occupied slot's body, if any.
    ///
    /// For callers that want a single representative body rather than
    /// the full register.
    pub fn first_occupied(&self) -> Option<&TrackedBody> {
        self.bodies.iter().flatten().next()
    }

    /// Iterate over all occupied slots in ascending order
    pub fn occupied(&self) -> impl Iterator<Item = &TrackedBody> {
        self.bodies.iter().flatten()
    }

    /// Diff one tick's frame against the previous tick.
    ///
    /// Expects exactly `capacity()` samples; anything else is a
    /// configuration error and the tick is rejected with no effects.
    /// Per slot, in ascending index order:
    ///
    /// - same identifier as last tick: no change
    /// - sentinel where a body was: exit, carrying the retained body
    /// - body where the sentinel was: enter
    /// - different body, no empty tick between: exit then enter, in
    ///   that order, on this same tick
    ///
    /// Events are computed against the pre-update snapshot; the snapshot
    /// is then replaced as a batch. Events land in the internal queue;
    /// consume them with [`drain_events`](Self::drain_events) or
    /// [`process_events`](Self::process_events).
    pub fn diff(&mut self, samples: &[BodySample]) -> Result<(), TrackerError> {
        if samples.len() != self.snapshot.len() {
            return Err(TrackerError::CapacityMismatch {
                expected: self.snapshot.len(),
                got: samples.len(),
            });
        }

        self.tick += 1;

        for (slot, sample) in samples.iter().enumerate() {
            let cur = sample.id;
            let prev = self.snapshot[slot];

            if cur == prev {
                // Occupancy unchanged; keep the retained payload fresh
                if let Some(body) = self.bodies[slot].as_mut() {
                    body.position = sample.position;
                }
                continue;
            }

            if prev.is_some() {
                self.emit_exit(slot);
            }
            if cur.is_some() {
                self.emit_enter(slot, sample);
            }
        }

        for (slot, sample) in samples.iter().enumerate() {
            self.snapshot[slot] = sample.id;
        }

        Ok(())
    }

    /// Drain queued events for external processing
    pub fn drain_events(&mut self) -> Vec<PresenceEvent> {
        std::mem::take(&mut self.event_queue)
    }

    /// Run queued events through the registered callbacks
    pub fn process_events(&mut self) {
        let events = std::mem::take(&mut self.event_queue);
        if let Some(ref handler) = self.handler {
            for event in &events {
                handler.handle(event);
            }
        }
    }

    /// Reconfigure for a new slot capacity.
    ///
    /// A capacity change invalidates the snapshot, so this is a full
    /// reset: every slot starts empty and pending events are dropped.
    pub fn reconfigure(&mut self, capacity: usize) {
        log::info!(
            "tracker reconfigured: {} -> {} slots",
            self.snapshot.len(),
            capacity
        );
        self.clear(capacity);
    }

    /// Reset all slots to empty, keeping the capacity
    pub fn reset(&mut self) {
        self.clear(self.snapshot.len());
    }

    fn clear(&mut self, capacity: usize) {
        self.snapshot = vec![TrackingId::NONE; capacity];
        self.bodies = vec![None; capacity];
        self.occupied = 0;
        self.tick = 0;
        self.event_queue.clear();
    }

    fn emit_exit(&mut self, slot: usize) {
        if let Some(body) = self.bodies[slot].take() {
            log::debug!("body {} left slot {}", body.id, slot);
            let ticks_present = self.tick.saturating_sub(body.entered_tick);
            self.event_queue
                .push(PresenceEvent::exit(body, self.tick, ticks_present));
            self.occupied -= 1;
        }
    }

    fn emit_enter(&mut self, slot: usize, sample: &BodySample) {
        log::debug!("body {} entered slot {}", sample.id, slot);
        let body = TrackedBody {
            slot,
            id: sample.id,
            position: sample.position,
            entered_tick: self.tick,
        };
        self.bodies[slot] = Some(body);
        self.occupied += 1;
        self.event_queue.push(PresenceEvent::enter(body, self.tick));
    }
}

// Manual Debug implementation (skip handler)
impl std::fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceTracker")
            .field("capacity", &self.snapshot.len())
            .field("occupied", &self.occupied)
            .field("tick", &self.tick)
            .field("pending_events", &self.event_queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PresenceEventKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn frame(ids: &[u64]) -> Vec<BodySample> {
        ids.iter()
            .map(|&id| BodySample::new(TrackingId::new(id)))
            .collect()
    }

    #[test]
    fn test_enter_and_exit() {
        let mut tracker = PresenceTracker::new(3);

        tracker.diff(&frame(&[5, 0, 0])).unwrap();
        let events = tracker.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_enter());
        assert_eq!(events[0].body.id.to_raw(), 5);
        assert_eq!(tracker.occupied_count(), 1);

        tracker.diff(&frame(&[0, 0, 0])).unwrap();
        let events = tracker.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_exit());
        assert_eq!(events[0].body.id.to_raw(), 5);
        assert_eq!(tracker.occupied_count(), 0);
    }

    #[test]
    fn test_unchanged_frame_is_silent() {
        let mut tracker = PresenceTracker::new(2);

        tracker.diff(&frame(&[3, 0])).unwrap();
        tracker.drain_events();

        tracker.diff(&frame(&[3, 0])).unwrap();
        assert!(tracker.drain_events().is_empty());
        assert_eq!(tracker.occupied_count(), 1);
    }

    #[test]
    fn test_handover_exits_before_entering() {
        let mut tracker = PresenceTracker::new(1);

        tracker.diff(&frame(&[5])).unwrap();
        tracker.drain_events();

        tracker.diff(&frame(&[9])).unwrap();
        let events = tracker.drain_events();
        assert_eq!(events.len(), 2);
        assert!(events[0].is_exit());
        assert_eq!(events[0].body.id.to_raw(), 5);
        assert!(events[1].is_enter());
        assert_eq!(events[1].body.id.to_raw(), 9);
        assert_eq!(tracker.occupied_count(), 1);
    }

    #[test]
    fn test_capacity_mismatch_rejects_tick() {
        let mut tracker = PresenceTracker::new(3);
        tracker.diff(&frame(&[5, 0, 0])).unwrap();
        tracker.drain_events();

        let err = tracker.diff(&frame(&[5, 0])).unwrap_err();
        assert_eq!(
            err,
            TrackerError::CapacityMismatch {
                expected: 3,
                got: 2
            }
        );

        // No partial effects: state is as of the last good tick
        assert_eq!(tracker.occupied_count(), 1);
        assert_eq!(tracker.tick(), 1);
        assert!(tracker.drain_events().is_empty());
        assert!(tracker.is_occupied(0));
    }

    #[test]
    fn test_exit_carries_retained_body() {
        let mut tracker = PresenceTracker::new(1);

        let sample = [BodySample::new(TrackingId::new(5)).with_position([1.0, 2.0, 3.0])];
        tracker.diff(&sample).unwrap();
        tracker.drain_events();

        tracker.diff(&frame(&[0])).unwrap();
        let events = tracker.drain_events();
        assert_eq!(events[0].body.position, [1.0, 2.0, 3.0]);
        assert_eq!(events[0].body.entered_tick, 1);
        assert_eq!(events[0].ticks_present, 1);
    }

    #[test]
    fn test_position_refreshed_while_occupied() {
        let mut tracker = PresenceTracker::new(1);

        tracker
            .diff(&[BodySample::new(TrackingId::new(5)).with_position([0.0, 0.0, 1.0])])
            .unwrap();
        tracker
            .diff(&[BodySample::new(TrackingId::new(5)).with_position([0.0, 0.0, 2.0])])
            .unwrap();
        tracker.drain_events();

        let body = tracker.body_at(0).unwrap();
        assert_eq!(body.position, [0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_first_occupied() {
        let mut tracker = PresenceTracker::new(4);
        assert!(tracker.first_occupied().is_none());

        tracker.diff(&frame(&[0, 0, 7, 4])).unwrap();
        tracker.drain_events();

        let first = tracker.first_occupied().unwrap();
        assert_eq!(first.slot, 2);
        assert_eq!(first.id.to_raw(), 7);
    }

    #[test]
    fn test_reconfigure_resets_everything() {
        let mut tracker = PresenceTracker::new(3);
        tracker.diff(&frame(&[5, 7, 0])).unwrap();

        tracker.reconfigure(6);
        assert_eq!(tracker.capacity(), 6);
        assert_eq!(tracker.occupied_count(), 0);
        assert_eq!(tracker.tick(), 0);
        assert!(tracker.drain_events().is_empty());

        // Prior occupants look like fresh enters
        tracker.diff(&frame(&[5, 7, 0, 0, 0, 0])).unwrap();
        let events = tracker.drain_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.is_enter()));
    }

    #[test]
    fn test_callbacks() {
        let enter_count = Arc::new(AtomicU32::new(0));
        let enter_clone = enter_count.clone();

        let mut tracker = PresenceTracker::new(2).on_enter(move |_| {
            enter_clone.fetch_add(1, Ordering::SeqCst);
        });

        tracker.diff(&frame(&[5, 7])).unwrap();
        tracker.process_events();

        assert_eq!(enter_count.load(Ordering::SeqCst), 2);
    }
}
