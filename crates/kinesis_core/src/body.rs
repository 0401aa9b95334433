//! Raw body records as reported by a frame source

use crate::id::TrackingId;

/// One slot's worth of data from a body frame.
///
/// The device fills a fixed-size array of these once per tick, one per
/// trackable slot. Payload fields are passed through untouched from the
/// device; no transforms or filtering are applied anywhere in Kinesis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodySample {
    /// Device-assigned identifier, the sentinel when the slot is empty
    pub id: TrackingId,
    /// Reference position reported by the device (meters, device space)
    pub position: [f32; 3],
}

impl BodySample {
    /// An empty slot
    pub const EMPTY: Self = Self {
        id: TrackingId::NONE,
        position: [0.0, 0.0, 0.0],
    };

    /// Create a sample for a tracked body
    pub fn new(id: TrackingId) -> Self {
        Self {
            id,
            position: [0.0, 0.0, 0.0],
        }
    }

    /// Set the reported position
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    /// Check whether the slot holds a body
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample() {
        assert!(BodySample::EMPTY.is_empty());
        assert!(BodySample::default().is_empty());
    }

    #[test]
    fn test_tracked_sample() {
        let sample = BodySample::new(TrackingId::new(7)).with_position([0.1, 1.2, 2.5]);
        assert!(!sample.is_empty());
        assert_eq!(sample.id.to_raw(), 7);
        assert_eq!(sample.position[2], 2.5);
    }
}
