//! Clock abstraction so time-based logic stays deterministic under test.

use chrono::{DateTime, Utc};

/// Source of "now" for all time arithmetic in the step-up services
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
