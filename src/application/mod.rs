//! Application layer - the shared throttle and its bookkeeping.
//!
//! This layer coordinates the domain rules behind a single lock:
//! - Entry table (key to last admission time)
//! - Keyed throttle (decision making and amortized sweeps)
//! - Metrics (decision and sweep counters)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the throttle independent of the
//! system clock.

pub mod metrics;
pub mod ports;
pub mod table;
pub mod throttle;
