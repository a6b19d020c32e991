//! Keyed throttle.
//!
//! Decides, per key, whether an operation may proceed now or must be
//! suppressed because the same key was admitted too recently. Stale entries
//! are swept inline, at most once per cleanup interval.

use crate::application::metrics::Metrics;
use crate::application::ports::Clock;
use crate::application::table::EntryTable;
use crate::domain::config::ThrottleConfig;
use crate::domain::schedule::CleanupSchedule;
use crate::domain::window::ThrottleWindow;
use crate::infrastructure::clock::SystemClock;

use std::borrow::Borrow;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// State guarded by the throttle's lock.
#[derive(Debug)]
struct ThrottleState<K>
where
    K: Eq + Hash,
{
    table: EntryTable<K>,
    schedule: CleanupSchedule,
}

impl<K> ThrottleState<K>
where
    K: Eq + Hash,
{
    fn sweep(&mut self, window: ThrottleWindow, now: Instant) -> SweepReport {
        let removed = self.table.sweep(window, now);
        self.schedule.mark_run(now);
        SweepReport {
            removed,
            remaining: self.table.len(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SweepReport {
    removed: usize,
    remaining: usize,
}

/// Allows an operation at most once per throttle window for each key.
///
/// Every call to [`allow`](Self::allow) runs under one exclusive lock: the
/// optional sweep, the lookup and the update are a single atomic step, so two
/// concurrent calls for the same key can never both be admitted inside one
/// window.
///
/// # Example
/// ```
/// use keyed_throttle::KeyedThrottle;
/// use std::time::Duration;
///
/// let throttle = KeyedThrottle::new(Duration::from_secs(60), Duration::from_secs(300));
///
/// assert!(throttle.allow("disk-full:/var"));
/// assert!(!throttle.allow("disk-full:/var"));
/// assert!(throttle.allow("disk-full:/home"));
/// ```
///
/// # Sharing
///
/// The throttle is `Sync`; share it with `Arc` or keep it in a `static`:
///
/// ```
/// use keyed_throttle::KeyedThrottle;
/// use std::sync::LazyLock;
/// use std::time::Duration;
///
/// static RETRIES: LazyLock<KeyedThrottle<u64>> =
///     LazyLock::new(|| KeyedThrottle::new(Duration::from_secs(5), Duration::from_secs(60)));
///
/// assert!(RETRIES.allow(7));
/// ```
#[derive(Debug)]
pub struct KeyedThrottle<K>
where
    K: Eq + Hash,
{
    state: Mutex<ThrottleState<K>>,
    window: ThrottleWindow,
    cleanup_interval: Duration,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl<K> KeyedThrottle<K>
where
    K: Eq + Hash,
{
    /// Create a throttle using the system clock.
    ///
    /// # Arguments
    /// * `throttle_window` - Minimum gap between two admissions of the same key
    /// * `cleanup_interval` - Minimum gap between two sweeps of stale entries
    ///
    /// Zero durations are accepted: a zero window admits every call and a
    /// zero interval sweeps on every call.
    pub fn new(throttle_window: Duration, cleanup_interval: Duration) -> Self {
        Self::builder()
            .with_throttle_window(throttle_window)
            .with_cleanup_interval(cleanup_interval)
            .build()
    }

    /// Create a throttle from a configuration value using the system clock.
    pub fn from_config(config: ThrottleConfig) -> Self {
        Self::builder().with_config(config).build()
    }

    /// Create a builder for configuring the throttle.
    pub fn builder() -> KeyedThrottleBuilder<K> {
        KeyedThrottleBuilder::new()
    }

    fn with_parts(config: ThrottleConfig, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            state: Mutex::new(ThrottleState {
                table: EntryTable::new(),
                schedule: CleanupSchedule::new(config.cleanup_interval, started_at),
            }),
            window: ThrottleWindow::new(config.throttle_window),
            cleanup_interval: config.cleanup_interval,
            clock,
            metrics: Metrics::new(),
        }
    }

    /// Decide whether the operation keyed by `key` may proceed now.
    ///
    /// Returns `true` if `key` has not been admitted within the throttle
    /// window; the current time is then recorded for it. Returns `false`
    /// otherwise and leaves its entry untouched.
    ///
    /// If the cleanup interval has elapsed since the last sweep, stale
    /// entries are removed first.
    pub fn allow(&self, key: K) -> bool {
        let (allowed, sweep) = {
            let mut state = self.lock();
            let now = self.clock.now();

            let sweep = if state.schedule.is_due(now) {
                Some(state.sweep(self.window, now))
            } else {
                None
            };

            (state.table.admit(key, self.window, now), sweep)
        };

        if let Some(report) = sweep {
            self.report_sweep(report);
        }

        if allowed {
            self.metrics.record_allowed();
        } else {
            self.metrics.record_suppressed();
        }

        allowed
    }

    /// Sweep stale entries now, regardless of the cleanup interval.
    ///
    /// Restarts the cleanup interval and returns the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let report = {
            let mut state = self.lock();
            let now = self.clock.now();
            state.sweep(self.window, now)
        };

        self.report_sweep(report);
        report.removed
    }

    /// Check whether `key` currently has an entry in the table.
    ///
    /// An entry may outlive its window until the next sweep removes it.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().table.last_allowed(key).is_some()
    }

    /// When `key` was last admitted, if it is still tracked.
    pub fn last_allowed<Q>(&self, key: &Q) -> Option<Instant>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lock().table.last_allowed(key)
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.lock().table.len()
    }

    /// Check if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.lock().table.is_empty()
    }

    /// When the last sweep completed (construction time if none has).
    pub fn last_sweep_at(&self) -> Instant {
        self.lock().schedule.last_run()
    }

    /// Minimum gap between two admissions of the same key.
    pub fn throttle_window(&self) -> Duration {
        self.window.duration()
    }

    /// Minimum gap between two sweeps.
    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    // The guarded state is consistent between statements, so a panic in
    // another holder leaves nothing half-written.
    fn lock(&self) -> MutexGuard<'_, ThrottleState<K>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_sweep(&self, report: SweepReport) {
        self.metrics.record_sweep(report.removed);
        tracing::debug!(
            target: "keyed_throttle::sweep",
            removed = report.removed,
            remaining = report.remaining,
            "swept expired throttle entries"
        );
    }
}

/// Builder for [`KeyedThrottle`].
///
/// # Example
/// ```
/// use keyed_throttle::KeyedThrottle;
/// use std::time::Duration;
///
/// let throttle: KeyedThrottle<(String, u16)> = KeyedThrottle::builder()
///     .with_throttle_window(Duration::from_secs(30))
///     .with_cleanup_interval(Duration::from_secs(120))
///     .build();
///
/// assert!(throttle.allow(("db-primary".to_string(), 5432)));
/// ```
pub struct KeyedThrottleBuilder<K> {
    config: ThrottleConfig,
    clock: Option<Arc<dyn Clock>>,
    _key: PhantomData<fn() -> K>,
}

impl<K> KeyedThrottleBuilder<K>
where
    K: Eq + Hash,
{
    /// Create a builder with the default configuration and the system clock.
    pub fn new() -> Self {
        Self {
            config: ThrottleConfig::default(),
            clock: None,
            _key: PhantomData,
        }
    }

    /// Set the minimum gap between two admissions of the same key.
    pub fn with_throttle_window(mut self, window: Duration) -> Self {
        self.config.throttle_window = window;
        self
    }

    /// Set the minimum gap between two sweeps.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cleanup_interval = interval;
        self
    }

    /// Replace both durations with those from `config`.
    pub fn with_config(mut self, config: ThrottleConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a custom clock (useful for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the throttle.
    pub fn build(self) -> KeyedThrottle<K> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        KeyedThrottle::with_parts(self.config, clock)
    }
}

impl<K> Default for KeyedThrottleBuilder<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> std::fmt::Debug for KeyedThrottleBuilder<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedThrottleBuilder")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::{MockCaptureLayer, MockClock};
    use std::thread;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    fn mock_throttle(window_ms: u64, cleanup_ms: u64) -> (KeyedThrottle<&'static str>, MockClock) {
        let clock = MockClock::new(Instant::now());
        let throttle = KeyedThrottle::builder()
            .with_throttle_window(Duration::from_millis(window_ms))
            .with_cleanup_interval(Duration::from_millis(cleanup_ms))
            .with_clock(Arc::new(clock.clone()))
            .build();
        (throttle, clock)
    }

    #[test]
    fn test_first_call_allowed_repeat_suppressed() {
        let (throttle, _clock) = mock_throttle(100, 1000);

        assert!(throttle.allow("k"));
        assert!(!throttle.allow("k"));
        assert!(!throttle.allow("k"));
    }

    #[test]
    fn test_window_expiry_readmits() {
        let (throttle, clock) = mock_throttle(50, 1000);

        assert!(throttle.allow("k"));
        clock.advance(Duration::from_millis(49));
        assert!(!throttle.allow("k"));
        clock.advance(Duration::from_millis(11));
        assert!(throttle.allow("k"));
    }

    #[test]
    fn test_exact_boundary_is_admitted() {
        let (throttle, clock) = mock_throttle(100, 1000);

        assert!(throttle.allow("k"));
        clock.advance(Duration::from_millis(100));
        assert!(throttle.allow("k"));
    }

    #[test]
    fn test_suppressed_call_does_not_extend_window() {
        let (throttle, clock) = mock_throttle(100, 1000);
        let start = clock.now();

        assert!(throttle.allow("k"));
        clock.advance(Duration::from_millis(60));
        assert!(!throttle.allow("k"));
        assert_eq!(throttle.last_allowed("k"), Some(start));

        clock.advance(Duration::from_millis(40));
        assert!(throttle.allow("k"));
    }

    #[test]
    fn test_keys_are_independent() {
        let (throttle, _clock) = mock_throttle(10_000, 1000);

        assert!(throttle.allow("a"));
        assert!(throttle.allow("b"));
        assert!(!throttle.allow("a"));
        assert!(!throttle.allow("b"));
    }

    #[test]
    fn test_zero_window_always_allows() {
        let (throttle, _clock) = mock_throttle(0, 1000);

        for _ in 0..5 {
            assert!(throttle.allow("k"));
        }
        assert_eq!(throttle.metrics().keys_suppressed(), 0);
    }

    #[test]
    fn test_sweep_waits_for_cleanup_interval() {
        let (throttle, clock) = mock_throttle(10, 100);

        assert!(throttle.allow("stale"));
        clock.advance(Duration::from_millis(50));

        // Entry is expired but no sweep is due yet
        assert!(throttle.allow("other"));
        assert!(throttle.contains_key("stale"));
        assert_eq!(throttle.metrics().sweeps_run(), 0);

        clock.advance(Duration::from_millis(50));
        assert!(throttle.allow("other"));
        assert!(!throttle.contains_key("stale"));
        assert_eq!(throttle.metrics().sweeps_run(), 1);
        assert_eq!(throttle.metrics().entries_evicted(), 2);
    }

    #[test]
    fn test_sweep_updates_last_sweep_at() {
        let (throttle, clock) = mock_throttle(10, 100);
        let start = clock.now();
        assert_eq!(throttle.last_sweep_at(), start);

        clock.advance(Duration::from_millis(150));
        throttle.allow("k");

        assert_eq!(throttle.last_sweep_at(), start + Duration::from_millis(150));
    }

    #[test]
    fn test_sweep_keeps_live_entries() {
        let (throttle, clock) = mock_throttle(200, 10);

        assert!(throttle.allow("k"));
        for _ in 0..20 {
            clock.advance(Duration::from_millis(5));
            assert!(!throttle.allow("k"));
        }

        assert!(throttle.contains_key("k"));
        assert!(throttle.metrics().sweeps_run() >= 9);
        assert_eq!(throttle.metrics().entries_evicted(), 0);
    }

    #[test]
    fn test_evicted_key_behaves_as_new() {
        let (throttle, clock) = mock_throttle(50, 50);

        assert!(throttle.allow("k"));
        clock.advance(Duration::from_millis(60));

        assert_eq!(throttle.sweep_expired(), 1);
        assert!(!throttle.contains_key("k"));
        assert!(throttle.is_empty());

        assert!(throttle.allow("k"));
        assert!(!throttle.allow("k"));
    }

    #[test]
    fn test_zero_cleanup_interval_sweeps_every_call() {
        let (throttle, _clock) = mock_throttle(100, 0);

        throttle.allow("a");
        throttle.allow("b");
        throttle.allow("c");

        assert_eq!(throttle.metrics().sweeps_run(), 3);
    }

    #[test]
    fn test_sweep_expired_restarts_interval() {
        let (throttle, clock) = mock_throttle(10, 100);

        clock.advance(Duration::from_millis(80));
        throttle.sweep_expired();
        clock.advance(Duration::from_millis(30));

        throttle.allow("k");
        assert_eq!(throttle.metrics().sweeps_run(), 1);
    }

    #[test]
    fn test_metrics_track_decisions() {
        let (throttle, _clock) = mock_throttle(100, 1000);

        throttle.allow("a");
        throttle.allow("a");
        throttle.allow("a");
        throttle.allow("b");

        let snapshot = throttle.metrics().snapshot();
        assert_eq!(snapshot.keys_allowed, 2);
        assert_eq!(snapshot.keys_suppressed, 2);
        assert_eq!(snapshot.total_decisions(), 4);
    }

    #[test]
    fn test_builder_defaults() {
        let throttle: KeyedThrottle<u32> = KeyedThrottle::builder().build();

        assert_eq!(throttle.throttle_window(), Duration::from_secs(1));
        assert_eq!(throttle.cleanup_interval(), Duration::from_secs(60));
        assert!(throttle.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = ThrottleConfig::new(Duration::from_millis(5), Duration::from_millis(7));
        let throttle: KeyedThrottle<u32> = KeyedThrottle::from_config(config);

        assert_eq!(throttle.throttle_window(), Duration::from_millis(5));
        assert_eq!(throttle.cleanup_interval(), Duration::from_millis(7));
    }

    #[test]
    fn test_composite_keys() {
        let throttle: KeyedThrottle<(String, u16)> =
            KeyedThrottle::new(Duration::from_secs(60), Duration::from_secs(60));

        assert!(throttle.allow(("host".to_string(), 80)));
        assert!(throttle.allow(("host".to_string(), 443)));
        assert!(!throttle.allow(("host".to_string(), 80)));
        assert_eq!(throttle.len(), 2);
    }

    #[test]
    fn test_sweep_emits_debug_event() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let (throttle, clock) = mock_throttle(10, 100);

        tracing::subscriber::with_default(subscriber, || {
            throttle.allow("a");
            throttle.allow("b");
            assert_eq!(capture.count(), 0);

            clock.advance(Duration::from_millis(100));
            throttle.allow("c");
        });

        let events = capture.get_captured();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::DEBUG);
        assert_eq!(events[0].target, "keyed_throttle::sweep");
        assert_eq!(events[0].field("removed"), Some("2"));
        assert_eq!(events[0].field("remaining"), Some("0"));
    }

    #[test]
    fn test_concurrent_same_key_admits_once() {
        let clock = MockClock::new(Instant::now());
        let throttle = Arc::new(
            KeyedThrottle::builder()
                .with_throttle_window(Duration::from_secs(60))
                .with_cleanup_interval(Duration::ZERO)
                .with_clock(Arc::new(clock))
                .build(),
        );
        let mut handles = vec![];

        for _ in 0..16 {
            let throttle = Arc::clone(&throttle);
            handles.push(thread::spawn(move || {
                (0..100).filter(|_| throttle.allow("shared")).count()
            }));
        }

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 1);
        assert_eq!(throttle.metrics().keys_suppressed(), 16 * 100 - 1);
    }

    #[test]
    fn test_survives_poisoned_lock() {
        let throttle = Arc::new(KeyedThrottle::new(
            Duration::from_secs(60),
            Duration::from_secs(60),
        ));
        assert!(throttle.allow(1u32));

        let poisoner = Arc::clone(&throttle);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison the throttle lock");
        })
        .join();

        assert!(!throttle.allow(1));
        assert!(throttle.allow(2));
    }
}
