//! # kinesis_sensor - Sensor Abstraction Layer
//!
//! Pluggable body-tracking sensor support with:
//! - Backend trait for vendor SDK wrappers
//! - Latest-frame acquisition (a tick with no frame is not an error)
//! - Device availability as an explicit, tick-driven state machine
//! - Simulated backend for tests and demos
//!
//! ## Architecture
//!
//! A [`SensorBackend`] wraps one vendor SDK: it opens the physical
//! sensor, exposes its body register capacity, and surfaces the latest
//! body frame when one is ready. The [`SensorSystem`] holds a registry
//! of named backends with one active, so hosts can swap vendors without
//! touching the rest of the pipeline. Availability polling lives in
//! [`LinkMonitor`], driven by the host's own update tick rather than a
//! blocking wait.
//!
//! ## Example
//!
//! ```ignore
//! use kinesis_sensor::prelude::*;
//!
//! let mut system = SensorSystem::new();
//! system.register_backend(Box::new(SimulatedBackend::new(6)));
//! system.initialize()?;
//!
//! let mut monitor = LinkMonitor::new(1.0);
//! loop {
//!     if let Some(LinkEvent::Ready(info)) = monitor.poll(dt, &mut system) {
//!         println!("{} slots available", info.max_bodies);
//!     }
//!     if monitor.state() == LinkState::Ready {
//!         if let Some(frame) = system.acquire_frame()? {
//!             // diff the frame
//!         }
//!     }
//! }
//! ```

pub mod link;
pub mod simulated;

pub use link::{LinkEvent, LinkMonitor, LinkState};
pub use simulated::SimulatedBackend;

use kinesis_core::BodySample;
use thiserror::Error;

/// Sensor error types
#[derive(Debug, Clone, Error)]
pub enum SensorError {
    /// Backend not initialized
    #[error("sensor not initialized")]
    NotInitialized,
    /// Device is not connected or not responding
    #[error("sensor unavailable")]
    Unavailable,
    /// No frame reader has been opened
    #[error("frame reader not open")]
    ReaderClosed,
    /// No backend registered with the system
    #[error("no sensor backend registered")]
    NoBackend,
    /// Vendor SDK error
    #[error("device error: {0}")]
    Device(String),
}

/// Description of a connected tracking device
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceInfo {
    /// Unique device identifier reported by the hardware
    pub device_id: String,
    /// Human-readable device name
    pub name: String,
    /// Maximum simultaneously trackable bodies (the slot capacity)
    pub max_bodies: usize,
    /// Nominal frame rate in Hz
    pub frame_rate: f32,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device_id: "unknown".to_string(),
            name: "Unknown".to_string(),
            max_bodies: 6,
            frame_rate: 30.0,
        }
    }
}

/// One tick's worth of body data.
///
/// Holds exactly `max_bodies` samples, one per slot. Frames are only
/// valid until the next acquisition; consumers borrow them for a single
/// diff pass and must not retain them.
#[derive(Clone, Debug)]
pub struct BodyFrame {
    /// Device timestamp in microseconds
    pub timestamp_us: u64,
    /// Per-slot samples, empty slots carrying the sentinel id
    pub samples: Vec<BodySample>,
}

impl BodyFrame {
    /// Create a frame from per-slot samples
    pub fn new(timestamp_us: u64, samples: Vec<BodySample>) -> Self {
        Self {
            timestamp_us,
            samples,
        }
    }

    /// Number of slots in the frame
    pub fn slot_count(&self) -> usize {
        self.samples.len()
    }

    /// Number of slots holding a body
    pub fn body_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_empty()).count()
    }
}

/// Sensor backend trait.
///
/// Implemented once per vendor SDK. All blocking work (device probing,
/// reader setup) happens inside these calls; the host decides when to
/// make them via [`LinkMonitor`].
pub trait SensorBackend: Send + Sync {
    /// Get backend name
    fn name(&self) -> &str;

    /// Initialize the backend (bind the SDK, locate the default device)
    fn initialize(&mut self) -> Result<(), SensorError>;

    /// Shutdown the backend, closing the device if open
    fn shutdown(&mut self);

    /// Check whether the physical device is currently present
    fn is_available(&self) -> bool;

    /// Get device description, if a device has been found
    fn device_info(&self) -> Option<&DeviceInfo>;

    /// Open the body frame reader, opening the sensor first if needed
    fn open_reader(&mut self) -> Result<(), SensorError>;

    /// Acquire the latest body frame.
    ///
    /// `Ok(None)` means no new frame is ready this tick; the caller
    /// skips its diff pass rather than diffing stale data.
    fn acquire_frame(&mut self) -> Result<Option<BodyFrame>, SensorError>;

    /// Pause or resume frame delivery (used during shutdown)
    fn set_paused(&mut self, paused: bool);
}

/// The main sensor system: a registry of backends with one active.
pub struct SensorSystem {
    /// Registered backends by name
    backends: std::collections::BTreeMap<String, Box<dyn SensorBackend>>,
    /// Active backend
    active_backend: Option<String>,
    /// Is initialized
    initialized: bool,
}

impl SensorSystem {
    /// Create a new sensor system
    pub fn new() -> Self {
        Self {
            backends: std::collections::BTreeMap::new(),
            active_backend: None,
            initialized: false,
        }
    }

    /// Register a backend; the first registered becomes active
    pub fn register_backend(&mut self, backend: Box<dyn SensorBackend>) {
        let name = backend.name().to_string();
        if self.active_backend.is_none() {
            self.active_backend = Some(name.clone());
        }
        self.backends.insert(name, backend);
    }

    /// Get active backend
    fn active(&self) -> Option<&dyn SensorBackend> {
        self.active_backend
            .as_ref()
            .and_then(|name| self.backends.get(name))
            .map(|b| b.as_ref())
    }

    /// Get active backend mutably
    fn active_mut(&mut self) -> Option<&mut (dyn SensorBackend + '_)> {
        let name = self.active_backend.clone()?;
        match self.backends.get_mut(&name) {
            Some(b) => Some(b.as_mut()),
            None => None,
        }
    }

    /// Check if any backend is registered
    pub fn has_backend(&self) -> bool {
        !self.backends.is_empty()
    }

    /// Initialize the active backend
    pub fn initialize(&mut self) -> Result<(), SensorError> {
        let backend = self.active_mut().ok_or(SensorError::NoBackend)?;
        backend.initialize()?;
        self.initialized = true;
        Ok(())
    }

    /// Shutdown: pause frame delivery, then close the device
    pub fn shutdown(&mut self) {
        if let Some(backend) = self.active_mut() {
            backend.set_paused(true);
            backend.shutdown();
        }
        self.initialized = false;
    }

    /// Check if initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Check whether the active device is present
    pub fn is_available(&self) -> bool {
        self.active().map(|b| b.is_available()).unwrap_or(false)
    }

    /// Get the active device's description
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.active().and_then(|b| b.device_info())
    }

    /// Open the active backend's frame reader
    pub fn open_reader(&mut self) -> Result<(), SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        let backend = self.active_mut().ok_or(SensorError::NoBackend)?;
        backend.open_reader()
    }

    /// Acquire the latest frame from the active backend
    pub fn acquire_frame(&mut self) -> Result<Option<BodyFrame>, SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        let backend = self.active_mut().ok_or(SensorError::NoBackend)?;
        backend.acquire_frame()
    }

    /// Pause or resume frame delivery
    pub fn set_paused(&mut self, paused: bool) {
        if let Some(backend) = self.active_mut() {
            backend.set_paused(paused);
        }
    }
}

impl Default for SensorSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::link::{LinkEvent, LinkMonitor, LinkState};
    pub use crate::simulated::SimulatedBackend;
    pub use crate::{BodyFrame, DeviceInfo, SensorBackend, SensorError, SensorSystem};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_system() {
        let mut system = SensorSystem::new();

        assert!(!system.has_backend());
        assert!(!system.is_available());
        assert!(system.device_info().is_none());
        assert!(matches!(
            system.initialize(),
            Err(SensorError::NoBackend)
        ));
    }

    #[test]
    fn test_uninitialized_acquire_fails() {
        let mut system = SensorSystem::new();
        system.register_backend(Box::new(SimulatedBackend::new(6)));

        assert!(matches!(
            system.acquire_frame(),
            Err(SensorError::NotInitialized)
        ));
    }

    #[test]
    fn test_frame_body_count() {
        use kinesis_core::{BodySample, TrackingId};

        let frame = BodyFrame::new(
            0,
            vec![
                BodySample::new(TrackingId::new(5)),
                BodySample::EMPTY,
                BodySample::new(TrackingId::new(9)),
            ],
        );
        assert_eq!(frame.slot_count(), 3);
        assert_eq!(frame.body_count(), 2);
    }
}
