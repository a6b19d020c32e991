//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Mock clock for testing.
///
/// Lets tests move time forward explicitly, so window expiry and sweep
/// scheduling can be checked without sleeping.
///
/// # Examples
///
/// Requires the `test-helpers` feature outside this crate's own tests.
///
/// ```ignore
/// use keyed_throttle::infrastructure::mocks::MockClock;
/// use keyed_throttle::KeyedThrottle;
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
///
/// let clock = MockClock::new(Instant::now());
/// let throttle = KeyedThrottle::builder()
///     .with_throttle_window(Duration::from_secs(30))
///     .with_clock(Arc::new(clock.clone()))
///     .build();
///
/// assert!(throttle.allow("job-17"));
/// assert!(!throttle.allow("job-17"));
///
/// clock.advance(Duration::from_secs(30));
/// assert!(throttle.allow("job-17"));
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying time value, so advancing time in
/// one clone affects all clones.
#[derive(Debug, Clone)]
pub struct MockClock {
    current_time: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    pub fn new(start: Instant) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time += duration;
    }

    /// Set the clock to a specific instant.
    ///
    /// Setting an earlier instant simulates a clock that moves backwards.
    pub fn set(&self, instant: Instant) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time = instant;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}
