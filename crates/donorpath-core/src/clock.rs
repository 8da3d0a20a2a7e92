//! Clock abstraction for determinism.
//!
//! Timestamps on journey events, engagement records, and the scene debounce
//! window all read time through this trait so tests can pin it.

use chrono::{DateTime, Utc};

/// Abstraction over system time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds elapsed since `earlier`, saturating at zero when the
    /// clock reads earlier than `earlier`.
    fn millis_since(&self, earlier: DateTime<Utc>) -> u64 {
        let delta = self.now() - earlier;
        u64::try_from(delta.num_milliseconds()).unwrap_or(0)
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
