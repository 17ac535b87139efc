//! Time seam for allocation expiry
//!
//! Expiry math goes through a trait so tests and simulation drive a
//! deterministic clock while production uses wall time.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A monotonic source of unix-epoch seconds.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the unix epoch.
    fn now(&self) -> u64;
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
