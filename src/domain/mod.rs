//! Domain layer - pure rules with no shared state.
//!
//! This layer contains the rules the throttle is built from:
//! - The throttle window (suppress and evict boundary)
//! - The cleanup schedule (when a sweep is due)
//! - The configuration value type
//!
//! All types in this layer take time as an argument and are easily testable.

pub mod config;
pub mod schedule;
pub mod window;
