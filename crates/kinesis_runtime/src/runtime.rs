//! Presence runtime
//!
//! The composition root: owns the sensor system, the link monitor and
//! the presence tracker, and forwards tracker events to subscribers.
//! Constructed once by the host and passed by reference to whatever
//! needs enter/exit notifications; there is no global instance.

use crate::config::RuntimeConfig;
use crate::stats::RuntimeStats;
use kinesis_event::{EventChannel, ObserverSet};
use kinesis_sensor::{
    DeviceInfo, LinkEvent, LinkMonitor, LinkState, SensorBackend, SensorError, SensorSystem,
};
use kinesis_tracker::{PresenceEvent, PresenceTracker};

/// Drives one sensor's body frames into presence events, once per host tick.
pub struct PresenceRuntime {
    system: SensorSystem,
    monitor: LinkMonitor,
    /// Built once the device reports its slot capacity
    tracker: Option<PresenceTracker>,
    channel: EventChannel<PresenceEvent>,
    observers: ObserverSet<PresenceEvent>,
    device: Option<DeviceInfo>,
    stats: RuntimeStats,
}

impl PresenceRuntime {
    /// Create a runtime with no backends registered
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            system: SensorSystem::new(),
            monitor: LinkMonitor::new(config.sensor.status_refresh_secs).with_backoff(
                config.sensor.backoff_factor,
                config.sensor.max_refresh_secs,
            ),
            tracker: None,
            channel: EventChannel::new(),
            observers: ObserverSet::new(),
            device: None,
            stats: RuntimeStats::default(),
        }
    }

    /// Register a sensor backend
    pub fn register_backend(&mut self, backend: Box<dyn SensorBackend>) {
        self.system.register_backend(backend);
    }

    /// Initialize the sensor system
    pub fn initialize(&mut self) -> Result<(), SensorError> {
        self.system.initialize()
    }

    /// Get the event queue consumers poll
    pub fn events(&self) -> &EventChannel<PresenceEvent> {
        &self.channel
    }

    /// Get the observer set for callback-style consumers
    pub fn observers(&self) -> &ObserverSet<PresenceEvent> {
        &self.observers
    }

    /// Get the current link state
    pub fn link_state(&self) -> LinkState {
        self.monitor.state()
    }

    /// Get the connected device's description, if any
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    /// Get the number of currently tracked bodies
    pub fn body_count(&self) -> usize {
        self.tracker.as_ref().map_or(0, |t| t.occupied_count())
    }

    /// Get the device's slot capacity, 0 before a device is ready
    pub fn max_bodies(&self) -> usize {
        self.tracker.as_ref().map_or(0, |t| t.capacity())
    }

    /// Get the tracker, if a device has been ready at least once
    pub fn tracker(&self) -> Option<&PresenceTracker> {
        self.tracker.as_ref()
    }

    /// Get session statistics
    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Advance the runtime by `dt` seconds.
    ///
    /// Drives availability polling, acquires at most one frame, runs the
    /// presence diff, and delivers any resulting events. A tick with no
    /// frame performs no diff: absence of data means absence of change.
    pub fn tick(&mut self, dt: f32) {
        self.stats.ticks += 1;

        match self.monitor.poll(dt, &mut self.system) {
            Some(LinkEvent::Ready(info)) => {
                // A (re)opened device invalidates all prior occupancy
                match self.tracker.as_mut() {
                    Some(tracker) if tracker.capacity() == info.max_bodies => tracker.reset(),
                    Some(tracker) => tracker.reconfigure(info.max_bodies),
                    None => self.tracker = Some(PresenceTracker::new(info.max_bodies)),
                }
                self.device = Some(info);
            }
            Some(LinkEvent::Lost) => {
                self.device = None;
            }
            None => {}
        }

        if self.monitor.state() != LinkState::Ready {
            return;
        }
        let Some(tracker) = self.tracker.as_mut() else {
            return;
        };

        match self.system.acquire_frame() {
            Ok(Some(frame)) => {
                match tracker.diff(&frame.samples) {
                    Ok(()) => {
                        self.stats.frames += 1;
                        self.stats.peak_occupied =
                            self.stats.peak_occupied.max(tracker.occupied_count());
                        for event in tracker.drain_events() {
                            if event.is_enter() {
                                self.stats.enters += 1;
                            } else {
                                self.stats.exits += 1;
                            }
                            self.observers.notify(&event);
                            self.channel.send(event);
                        }
                    }
                    Err(e) => {
                        // Capacity drifted without a reopen; drop the tick
                        self.stats.frames_rejected += 1;
                        log::error!("frame dropped: {}", e);
                    }
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("frame acquisition failed: {}", e),
        }
    }

    /// Shut the sensor down, pausing frame delivery first
    pub fn shutdown(&mut self) {
        self.system.shutdown();
        self.device = None;
    }

    /// Build a status report string for diagnostics overlays
    pub fn status_report(&self) -> String {
        format!(
            "--- Presence Runtime ---\nDevice: {}\nCurrent Body Count: {}/{}",
            self.device
                .as_ref()
                .map_or("Not available", |d| d.device_id.as_str()),
            self.body_count(),
            self.max_bodies(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinesis_core::{BodySample, TrackingId};
    use kinesis_sensor::SimulatedBackend;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn samples(ids: &[u64]) -> Vec<BodySample> {
        ids.iter()
            .map(|&id| BodySample::new(TrackingId::new(id)))
            .collect()
    }

    fn runtime_with_script(script: Vec<Vec<BodySample>>) -> PresenceRuntime {
        let mut runtime = PresenceRuntime::new(&RuntimeConfig::default());
        runtime.register_backend(Box::new(SimulatedBackend::new(3).with_script(script)));
        runtime.initialize().unwrap();
        runtime
    }

    #[test]
    fn test_session_end_to_end() {
        let mut runtime = runtime_with_script(vec![
            samples(&[5, 0, 0]),
            samples(&[5, 7, 0]),
            samples(&[0, 7, 0]),
        ]);

        let enters = Arc::new(AtomicU32::new(0));
        let enters_clone = enters.clone();
        runtime.observers().subscribe(move |event: &PresenceEvent| {
            if event.is_enter() {
                enters_clone.fetch_add(1, Ordering::SeqCst);
            }
        });

        let dt = 1.0 / 30.0;
        // First tick brings the link up and plays the first frame
        for _ in 0..4 {
            runtime.tick(dt);
        }

        assert_eq!(runtime.link_state(), LinkState::Ready);
        assert_eq!(enters.load(Ordering::SeqCst), 2);
        assert_eq!(runtime.body_count(), 1);
        assert_eq!(runtime.stats().enters, 2);
        assert_eq!(runtime.stats().exits, 1);
        assert_eq!(runtime.stats().peak_occupied, 2);

        // Channel saw the same events the observers did
        assert_eq!(runtime.events().drain().len(), 3);
    }

    #[test]
    fn test_dry_ticks_change_nothing() {
        let mut runtime = runtime_with_script(vec![samples(&[5, 0, 0])]);

        let dt = 1.0 / 30.0;
        for _ in 0..10 {
            runtime.tick(dt);
        }

        // Script ran dry after one frame; nothing further was emitted
        assert_eq!(runtime.stats().frames, 1);
        assert_eq!(runtime.body_count(), 1);
        assert_eq!(runtime.events().drain().len(), 1);
    }

    #[test]
    fn test_status_report_without_device() {
        let mut runtime = PresenceRuntime::new(&RuntimeConfig::default());
        runtime.register_backend(Box::new(
            SimulatedBackend::new(3).available_after(u32::MAX),
        ));
        runtime.initialize().unwrap();
        runtime.tick(1.0);

        let report = runtime.status_report();
        assert!(report.contains("Not available"));
        assert!(report.contains("0/0"));
    }

    #[test]
    fn test_status_report_with_device() {
        let mut runtime = runtime_with_script(vec![samples(&[5, 0, 0])]);
        runtime.tick(1.0);

        let report = runtime.status_report();
        assert!(report.contains("simulated-0"));
        assert!(report.contains("1/3"));
    }
}
