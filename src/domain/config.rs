//! Throttle configuration.

use std::time::Duration;

/// Default minimum gap between two admissions of the same key.
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_secs(1);

/// Default minimum gap between two sweeps of the entry table.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// The two durations a throttle is built from.
///
/// Both are accepted as given: a zero `throttle_window` admits every call and
/// a zero `cleanup_interval` sweeps on every call.
///
/// With the `serde` feature enabled this can be embedded in a host
/// application's own configuration. Durations use serde's default
/// `{ secs, nanos }` representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThrottleConfig {
    /// Minimum gap between two admissions of the same key
    pub throttle_window: Duration,
    /// Minimum gap between two sweeps
    pub cleanup_interval: Duration,
}

impl ThrottleConfig {
    /// Create a configuration from explicit durations.
    pub fn new(throttle_window: Duration, cleanup_interval: Duration) -> Self {
        Self {
            throttle_window,
            cleanup_interval,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_WINDOW, DEFAULT_CLEANUP_INTERVAL)
    }
}
