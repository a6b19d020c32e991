//! Amortized cleanup schedule.
//!
//! Sweeps run inline on the calling thread, at most once per interval,
//! instead of on a background timer.

use std::time::{Duration, Instant};

/// Tracks when the entry table was last swept and when the next sweep is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSchedule {
    interval: Duration,
    last_run: Instant,
}

impl CleanupSchedule {
    /// Create a schedule whose first interval starts at `started_at`.
    pub fn new(interval: Duration, started_at: Instant) -> Self {
        Self {
            interval,
            last_run: started_at,
        }
    }

    /// Minimum gap between two sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the last completed sweep ran (construction time if none has).
    pub fn last_run(&self) -> Instant {
        self.last_run
    }

    /// Whether a sweep should run at `now`.
    ///
    /// A zero interval is always due.
    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_run) >= self.interval
    }

    /// Record a completed sweep.
    ///
    /// `last_run` never moves backwards, even if `now` does.
    pub fn mark_run(&mut self, now: Instant) {
        if now > self.last_run {
            self.last_run = now;
        }
    }
}
