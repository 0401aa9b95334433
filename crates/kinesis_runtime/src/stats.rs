//! Runtime statistics

/// Counters about a presence session
#[derive(Debug, Clone, Default)]
pub struct RuntimeStats {
    /// Total ticks processed
    pub ticks: u64,
    /// Frames acquired and diffed
    pub frames: u64,
    /// Frames rejected for a slot count mismatch
    pub frames_rejected: u64,
    /// Enter events delivered
    pub enters: u64,
    /// Exit events delivered
    pub exits: u64,
    /// Most bodies seen at once
    pub peak_occupied: usize,
}
