//! # keyed-throttle
//!
//! A concurrency-safe throttle keyed by arbitrary hashable values.
//!
//! For each distinct key, [`KeyedThrottle::allow`] answers one question: may the
//! operation for this key run now, or did the same key run too recently? Use it
//! to keep an expensive or side-effecting action (sending an alert, retrying a
//! request, refreshing a cache entry) from firing more than once per window for
//! the same subject.
//!
//! ## Quick Start
//!
//! ```rust
//! use keyed_throttle::KeyedThrottle;
//! use std::time::Duration;
//!
//! // At most one alert per host every 5 minutes; drop stale hosts every 10.
//! let alerts = KeyedThrottle::new(Duration::from_secs(300), Duration::from_secs(600));
//!
//! if alerts.allow("db-01") {
//!     // send the alert
//! }
//! assert!(!alerts.allow("db-01"));
//! assert!(alerts.allow("db-02"));
//! ```
//!
//! ## Decision Rule
//!
//! A key is suppressed while the time since its last admission is strictly
//! less than the throttle window. At exactly the window, or later, it is
//! admitted again and its timestamp is overwritten. Suppressed calls leave the
//! timestamp untouched, so a stream of rejected calls never extends the window.
//!
//! ## Memory
//!
//! Every admitted key keeps one entry. Keys that are seen once and never again
//! would grow the table forever, so `allow` sweeps it inline: when at least one
//! cleanup interval has passed since the last sweep, every entry whose window
//! has elapsed is removed before the decision is made. There is no background
//! thread to start or stop. The sweep costs O(n) in tracked keys and runs at
//! most once per interval. [`KeyedThrottle::sweep_expired`] runs one on demand.
//!
//! An evicted key behaves exactly like a key that was never seen, which is
//! also how an expired but not yet evicted key behaves.
//!
//! ## Concurrency
//!
//! All state sits behind one mutex, and the sweep, lookup and update happen in
//! a single critical section. Concurrent calls for the same key are therefore
//! serialized: exactly one of them is admitted per window.
//!
//! ```rust
//! use keyed_throttle::KeyedThrottle;
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//!
//! let throttle = Arc::new(KeyedThrottle::new(Duration::from_secs(60), Duration::from_secs(60)));
//!
//! let handles: Vec<_> = (0..8)
//!     .map(|_| {
//!         let throttle = Arc::clone(&throttle);
//!         thread::spawn(move || throttle.allow("payment-42"))
//!     })
//!     .collect();
//!
//! let admitted = handles
//!     .into_iter()
//!     .map(|h| h.join().unwrap())
//!     .filter(|admitted| *admitted)
//!     .count();
//! assert_eq!(admitted, 1);
//! ```
//!
//! ## Observability
//!
//! Passive counters are available through [`KeyedThrottle::metrics`]. Each
//! completed sweep also emits a `DEBUG` event on the `keyed_throttle::sweep`
//! target with `removed` and `remaining` fields; decisions themselves are not
//! logged.
//!
//! ```rust
//! # use keyed_throttle::KeyedThrottle;
//! # use std::time::Duration;
//! let throttle = KeyedThrottle::new(Duration::from_secs(1), Duration::from_secs(60));
//! throttle.allow(1u64);
//! throttle.allow(1u64);
//!
//! let snapshot = throttle.metrics().snapshot();
//! assert_eq!(snapshot.keys_allowed, 1);
//! assert_eq!(snapshot.keys_suppressed, 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`ThrottleConfig`]
//! - `test-helpers`: exposes `infrastructure::mocks` (`MockClock`, `MockCaptureLayer`)

// Domain layer - pure rules
pub mod domain;

// Application layer - shared state and orchestration
pub mod application;

// Infrastructure layer - adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    config::{ThrottleConfig, DEFAULT_CLEANUP_INTERVAL, DEFAULT_THROTTLE_WINDOW},
    schedule::CleanupSchedule,
    window::ThrottleWindow,
};

pub use application::{
    metrics::{Metrics, MetricsSnapshot},
    ports::Clock,
    table::EntryTable,
    throttle::{KeyedThrottle, KeyedThrottleBuilder},
};

pub use infrastructure::clock::SystemClock;
