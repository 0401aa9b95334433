//! Simulated sensor backend
//!
//! Plays a scripted sequence of body frames without any hardware. Used
//! by the test suites and the demo binary; availability can be scripted
//! too, so link monitoring is testable tick by tick.

use crate::{BodyFrame, DeviceInfo, SensorBackend, SensorError};
use kinesis_core::BodySample;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

/// Scripted in-memory sensor backend.
pub struct SimulatedBackend {
    info: DeviceInfo,
    /// Frames to play, oldest first
    script: VecDeque<Vec<BodySample>>,
    /// Availability check index at which the device appears
    available_from: u32,
    /// Availability check index at which the device disappears
    available_until: u32,
    /// Availability checks seen so far
    polls: AtomicU32,
    initialized: bool,
    reader_open: bool,
    paused: bool,
    timestamp_us: u64,
    frame_interval_us: u64,
}

impl SimulatedBackend {
    /// Create a backend simulating a device with `max_bodies` slots
    pub fn new(max_bodies: usize) -> Self {
        Self {
            info: DeviceInfo {
                device_id: "simulated-0".to_string(),
                name: "Simulated Body Tracker".to_string(),
                max_bodies,
                frame_rate: 30.0,
            },
            script: VecDeque::new(),
            available_from: 0,
            available_until: u32::MAX,
            polls: AtomicU32::new(0),
            initialized: false,
            reader_open: false,
            paused: false,
            timestamp_us: 0,
            frame_interval_us: 33_333,
        }
    }

    /// Report the device absent for the first `checks` availability checks
    pub fn available_after(mut self, checks: u32) -> Self {
        self.available_from = checks;
        self
    }

    /// Report the device present for only the first `checks` availability checks
    pub fn available_for(mut self, checks: u32) -> Self {
        self.available_until = checks;
        self
    }

    /// Set the scripted frames, oldest first
    pub fn with_script(mut self, frames: Vec<Vec<BodySample>>) -> Self {
        self.script = frames.into();
        self
    }

    /// Append one frame to the script
    pub fn push_frame(&mut self, samples: Vec<BodySample>) {
        self.script.push_back(samples);
    }

    /// Frames remaining in the script
    pub fn frames_remaining(&self) -> usize {
        self.script.len()
    }
}

impl SensorBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    fn initialize(&mut self) -> Result<(), SensorError> {
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.reader_open = false;
        self.initialized = false;
    }

    fn is_available(&self) -> bool {
        let n = self.polls.fetch_add(1, Ordering::Relaxed);
        n >= self.available_from && n < self.available_until
    }

    fn device_info(&self) -> Option<&DeviceInfo> {
        self.initialized.then_some(&self.info)
    }

    fn open_reader(&mut self) -> Result<(), SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        self.reader_open = true;
        Ok(())
    }

    fn acquire_frame(&mut self) -> Result<Option<BodyFrame>, SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        if !self.reader_open {
            return Err(SensorError::ReaderClosed);
        }
        if self.paused {
            return Ok(None);
        }

        let Some(mut samples) = self.script.pop_front() else {
            return Ok(None);
        };

        // The device always reports its full register
        samples.resize(self.info.max_bodies, BodySample::EMPTY);

        self.timestamp_us += self.frame_interval_us;
        Ok(Some(BodyFrame::new(self.timestamp_us, samples)))
    }

    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
}
