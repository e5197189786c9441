//! Clock seam so tests control issuance and expiry timing.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of the registry's notion of "now".
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time. The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests. Time moves only when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to a specific instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }

    /// Move forward by a duration.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Wraps another clock and never reads earlier than a previous reading.
///
/// The registry observes time only through this wrapper, so a credential
/// seen as expired stays expired even when the underlying clock later
/// reports an earlier instant (NTP step, manual reset, test rewind).
pub struct MonotonicClock {
    inner: Arc<dyn Clock>,
    high_water: Mutex<DateTime<Utc>>,
}

impl MonotonicClock {
    /// Wrap a clock. The high-water mark starts at the wrapped clock's
    /// first reading.
    pub fn new(inner: Arc<dyn Clock>) -> Self {
        let high_water = Mutex::new(inner.now());
        Self { inner, high_water }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let reading = self.inner.now();
        let mut high_water = self.high_water.lock();
        if reading > *high_water {
            *high_water = reading;
        }
        *high_water
    }
}
