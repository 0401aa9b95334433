//! Kinesis Tracker - Body Presence Tracking
//!
//! This crate turns per-tick body frames into enter/exit events by diffing
//! slot identifiers against the previous tick.
//!
//! # Features
//!
//! - Fixed-capacity slot model matching the device's body register
//! - Enter/Exit events, with same-tick handover (exit before enter)
//! - Retained last-known body per slot so exits carry identity
//! - Occupied count and first-occupied queries
//! - Full reset on capacity reconfiguration
//!
//! # Example
//!
//! ```ignore
//! use kinesis_tracker::prelude::*;
//!
//! let mut tracker = PresenceTracker::new(6)
//!     .on_enter(|event| println!("body {} entered", event.body.id));
//!
//! // Once per frame:
//! tracker.diff(&frame.samples)?;
//! tracker.process_events();
//! ```

pub mod events;
pub mod tracker;

pub mod prelude {
    pub use crate::events::{PresenceEvent, PresenceEventKind, PresenceHandler, TrackedBody};
    pub use crate::tracker::{PresenceTracker, TrackerError};
}

pub use prelude::*;
