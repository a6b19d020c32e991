//! Observability metrics for throttling.
//!
//! Passive counters describing what the throttle has decided so far.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking throttle decisions and table maintenance.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Cloning shares the underlying counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Calls that were admitted
    keys_allowed: AtomicU64,
    /// Calls that were suppressed
    keys_suppressed: AtomicU64,
    /// Entries removed by sweeps
    entries_evicted: AtomicU64,
    /// Completed sweeps
    sweeps_run: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                keys_allowed: AtomicU64::new(0),
                keys_suppressed: AtomicU64::new(0),
                entries_evicted: AtomicU64::new(0),
                sweeps_run: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_allowed(&self) {
        self.inner.keys_allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.inner.keys_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed sweep that removed `evicted` entries.
    pub(crate) fn record_sweep(&self, evicted: usize) {
        self.inner.sweeps_run.fetch_add(1, Ordering::Relaxed);
        self.inner
            .entries_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
    }

    /// Get the total number of admitted calls.
    pub fn keys_allowed(&self) -> u64 {
        self.inner.keys_allowed.load(Ordering::Relaxed)
    }

    /// Get the total number of suppressed calls.
    pub fn keys_suppressed(&self) -> u64 {
        self.inner.keys_suppressed.load(Ordering::Relaxed)
    }

    /// Get the total number of entries removed by sweeps.
    pub fn entries_evicted(&self) -> u64 {
        self.inner.entries_evicted.load(Ordering::Relaxed)
    }

    /// Get the number of completed sweeps.
    pub fn sweeps_run(&self) -> u64 {
        self.inner.sweeps_run.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            keys_allowed: self.keys_allowed(),
            keys_suppressed: self.keys_suppressed(),
            entries_evicted: self.entries_evicted(),
            sweeps_run: self.sweeps_run(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.keys_allowed.store(0, Ordering::Relaxed);
        self.inner.keys_suppressed.store(0, Ordering::Relaxed);
        self.inner.entries_evicted.store(0, Ordering::Relaxed);
        self.inner.sweeps_run.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Calls that were admitted
    pub keys_allowed: u64,
    /// Calls that were suppressed
    pub keys_suppressed: u64,
    /// Entries removed by sweeps
    pub entries_evicted: u64,
    /// Completed sweeps
    pub sweeps_run: u64,
}

impl MetricsSnapshot {
    /// Ratio of suppressed calls to all decisions (0.0 to 1.0).
    ///
    /// Returns 0.0 if no decisions have been made.
    pub fn suppression_rate(&self) -> f64 {
        let total = self.total_decisions();
        if total == 0 {
            0.0
        } else {
            self.keys_suppressed as f64 / total as f64
        }
    }

    /// Total number of decisions (allowed + suppressed).
    pub fn total_decisions(&self) -> u64 {
        self.keys_allowed.saturating_add(self.keys_suppressed)
    }
}
