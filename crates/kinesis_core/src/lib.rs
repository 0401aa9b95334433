//! # kinesis_core - Kinesis Core
//!
//! Zero-dependency primitives shared by every Kinesis crate: tracking
//! identifiers and the raw per-slot body record a frame source produces.
//! Keeping these here lets the sensor and tracker crates agree on a data
//! model without depending on each other.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod body;
pub mod id;

pub use body::*;
pub use id::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::body::BodySample;
    pub use crate::id::{IdGenerator, TrackingId};
}
