//! Infrastructure layer - adapters for the application ports.
//!
//! This layer provides:
//! - Clock abstraction (system time vs mock)
//! - Test doubles for time and for observing the throttle's `tracing` output

pub mod clock;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides controllable test doubles for testing
/// throttling behavior without sleeping.
///
/// To use these mocks in another crate's tests, add to its `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// keyed-throttle = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
