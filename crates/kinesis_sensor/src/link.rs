//! Sensor link availability state machine
//!
//! Replaces a blocking "wait until the device shows up" loop with an
//! explicit state machine driven by the host's own update tick. While
//! the device is absent the poll interval backs off multiplicatively up
//! to a cap, then snaps back to the base rate once the link is up.

use crate::{DeviceInfo, SensorError, SensorSystem};
use serde::{Deserialize, Serialize};

/// Availability of the sensor link
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    /// No device present; polling for one
    Unavailable,
    /// Device present; opening the frame reader
    Opening,
    /// Frame reader open and delivering
    Ready,
}

impl Default for LinkState {
    fn default() -> Self {
        Self::Unavailable
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::Opening => write!(f, "opening"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// State transition reported by [`LinkMonitor::poll`]
#[derive(Clone, Debug)]
pub enum LinkEvent {
    /// Frame reader opened; carries the device description so the host
    /// can size its tracking structures
    Ready(DeviceInfo),
    /// Device disappeared mid-session
    Lost,
}

/// Tick-driven availability monitor with retry backoff.
pub struct LinkMonitor {
    state: LinkState,
    /// Base poll interval while the device is absent, seconds
    refresh_secs: f32,
    /// Multiplier applied to the interval after each absent poll
    backoff_factor: f32,
    /// Upper bound on the poll interval, seconds
    max_refresh_secs: f32,
    /// Current poll interval
    retry_secs: f32,
    /// Seconds since the last availability check
    elapsed: f32,
}

impl LinkMonitor {
    /// Create a monitor polling every `refresh_secs` while absent
    pub fn new(refresh_secs: f32) -> Self {
        Self {
            state: LinkState::Unavailable,
            refresh_secs,
            backoff_factor: 1.0,
            max_refresh_secs: refresh_secs,
            retry_secs: refresh_secs,
            // Check immediately on the first poll
            elapsed: refresh_secs,
        }
    }

    /// Enable backoff: interval grows by `factor` per absent poll, up to `max_secs`
    pub fn with_backoff(mut self, factor: f32, max_secs: f32) -> Self {
        self.backoff_factor = factor.max(1.0);
        self.max_refresh_secs = max_secs.max(self.refresh_secs);
        self
    }

    /// Get the current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Get the current poll interval in seconds
    pub fn retry_interval(&self) -> f32 {
        self.retry_secs
    }

    /// Advance the monitor by `dt` seconds.
    ///
    /// Call once per host tick, before frame acquisition. Returns a
    /// [`LinkEvent`] on the ticks where the link comes up or goes down.
    pub fn poll(&mut self, dt: f32, system: &mut SensorSystem) -> Option<LinkEvent> {
        match self.state {
            LinkState::Unavailable => {
                self.elapsed += dt;
                if self.elapsed < self.retry_secs {
                    return None;
                }
                self.elapsed = 0.0;

                if system.is_available() {
                    self.state = LinkState::Opening;
                    self.retry_secs = self.refresh_secs;
                    self.try_open(system)
                } else {
                    self.retry_secs =
                        (self.retry_secs * self.backoff_factor).min(self.max_refresh_secs);
                    log::debug!("sensor absent, next poll in {:.1}s", self.retry_secs);
                    None
                }
            }
            LinkState::Opening => self.try_open(system),
            LinkState::Ready => {
                if system.is_available() {
                    None
                } else {
                    log::warn!("sensor link lost");
                    self.state = LinkState::Unavailable;
                    self.retry_secs = self.refresh_secs;
                    self.elapsed = 0.0;
                    Some(LinkEvent::Lost)
                }
            }
        }
    }

    fn try_open(&mut self, system: &mut SensorSystem) -> Option<LinkEvent> {
        let opened = match system.open_reader() {
            Ok(()) => system
                .device_info()
                .cloned()
                .ok_or(SensorError::Unavailable),
            Err(e) => Err(e),
        };
        match opened {
            Ok(info) => {
                log::info!(
                    "sensor link ready: {} ({} body slots)",
                    info.device_id,
                    info.max_bodies
                );
                self.state = LinkState::Ready;
                Some(LinkEvent::Ready(info))
            }
            Err(e) => {
                log::warn!("failed to open frame reader: {}", e);
                self.state = LinkState::Unavailable;
                self.retry_secs =
                    (self.retry_secs * self.backoff_factor).min(self.max_refresh_secs);
                self.elapsed = 0.0;
                None
            }
        }
    }
}
