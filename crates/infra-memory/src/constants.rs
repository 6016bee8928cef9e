// In-memory engine constants
use std::time::Duration;

/// Interval between idle polls of a serving worker (100ms)
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
