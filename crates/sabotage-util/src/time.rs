//! Time utilities for sabotaged
//!
//! Wall-clock time is used for the timestamps reported to clients. Monotonic
//! time measures how long a meeting actually ran.

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Get the current local time
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Represents a point in monotonic time.
/// This is immune to wall-clock changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn duration_since(&self, earlier: MonotonicInstant) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicInstant(self.0 + rhs)
    }
}
