//! Time Abstraction
//!
//! Provides an injectable time source so TTL expiry and probe bookkeeping
//! are deterministic under test.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Time source trait
///
/// Abstracts system time to enable deterministic testing.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::time::Clock;
///
/// fn stamp(clock: &dyn Clock) -> i64 {
///     clock.unix_timestamp_millis()
/// }
/// ```
pub trait Clock: Send + Sync {
    /// Get current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Get current Unix timestamp in seconds
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }

    /// Get current Unix timestamp in milliseconds
    fn unix_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// System clock implementation using actual system time
#[derive(Debug, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
///
/// Starts at a fixed instant; `advance_millis` moves it forward.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_millis: Arc<Mutex<i64>>,
}

impl ManualClock {
    /// Create a clock frozen at the given Unix-millisecond timestamp.
    pub fn at_millis(millis: i64) -> Self {
        Self {
            now_millis: Arc::new(Mutex::new(millis)),
        }
    }

    /// Move the clock forward.
    pub fn advance_millis(&self, delta: i64) {
        *self.now_millis.lock() += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_millis(1_700_000_000_000)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(*self.now_millis.lock())
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
    }

    fn unix_timestamp_millis(&self) -> i64 {
        *self.now_millis.lock()
    }
}
