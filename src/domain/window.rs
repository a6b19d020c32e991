//! Throttle window rule.
//!
//! Decides, from the age of a key's last admission, whether a new call for
//! that key is suppressed and whether its entry may be dropped by a sweep.

use std::time::{Duration, Instant};

/// Minimum gap required between two admissions of the same key.
///
/// The rule uses a single boundary for both questions it answers:
/// an entry whose age is strictly below the window suppresses new calls and
/// must be retained; once its age reaches the window it no longer suppresses
/// and may be evicted.
///
/// # Example
/// ```
/// use keyed_throttle::ThrottleWindow;
/// use std::time::{Duration, Instant};
///
/// let window = ThrottleWindow::new(Duration::from_millis(100));
/// let admitted = Instant::now();
///
/// assert!(window.suppresses(admitted, admitted + Duration::from_millis(99)));
/// assert!(!window.suppresses(admitted, admitted + Duration::from_millis(100)));
/// assert!(window.is_expired(admitted, admitted + Duration::from_millis(100)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThrottleWindow {
    duration: Duration,
}

impl ThrottleWindow {
    /// Create a window of the given length.
    ///
    /// A zero window never suppresses.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Age of an entry admitted at `admitted_at`, observed at `now`.
    ///
    /// Saturates to zero if `now` is earlier than `admitted_at`.
    pub fn age(admitted_at: Instant, now: Instant) -> Duration {
        now.saturating_duration_since(admitted_at)
    }

    /// Whether an entry admitted at `admitted_at` still suppresses at `now`.
    pub fn suppresses(&self, admitted_at: Instant, now: Instant) -> bool {
        Self::age(admitted_at, now) < self.duration
    }

    /// Whether an entry admitted at `admitted_at` can be evicted at `now`.
    ///
    /// Always the exact complement of [`suppresses`](Self::suppresses).
    pub fn is_expired(&self, admitted_at: Instant, now: Instant) -> bool {
        !self.suppresses(admitted_at, now)
    }
}

impl From<Duration> for ThrottleWindow {
    fn from(duration: Duration) -> Self {
        Self::new(duration)
    }
}
