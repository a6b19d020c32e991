//! Alert de-duplication with a shared keyed throttle.
//!
//! A monitor checks a handful of hosts every tick and raises an alert for each
//! unhealthy one. The throttle keeps each (host, check) pair from alerting
//! more than once per window, and sweeps stale pairs as it goes.
//!
//! Run with: `cargo run --example alerts`

use keyed_throttle::KeyedThrottle;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Check {
    Disk,
    Latency,
}

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    println!("=== Alert De-duplication Example ===\n");
    println!("Window: 200ms per (host, check), sweep every 100ms\n");

    let alerts = Arc::new(
        KeyedThrottle::builder()
            .with_throttle_window(Duration::from_millis(200))
            .with_cleanup_interval(Duration::from_millis(100))
            .build(),
    );

    let monitors: Vec<_> = [("web-01", Check::Latency), ("db-01", Check::Disk)]
        .into_iter()
        .map(|(host, check)| {
            let alerts = Arc::clone(&alerts);
            thread::spawn(move || {
                for tick in 0..10 {
                    if alerts.allow((host, check)) {
                        warn!(host, ?check, tick, "alert raised");
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            })
        })
        .collect();

    for monitor in monitors {
        let _ = monitor.join();
    }

    // Let every entry age out, then trigger a sweep with a fresh key
    thread::sleep(Duration::from_millis(250));
    alerts.allow(("cache-01", Check::Disk));

    let snapshot = alerts.metrics().snapshot();
    info!(
        allowed = snapshot.keys_allowed,
        suppressed = snapshot.keys_suppressed,
        evicted = snapshot.entries_evicted,
        sweeps = snapshot.sweeps_run,
        tracked = alerts.len(),
        "monitoring finished"
    );

    println!("\n=== Example Complete ===");
    println!(
        "Notice: each host alerted about every 200ms instead of every 50ms tick ({:.0}% suppressed).",
        snapshot.suppression_rate() * 100.0
    );
}
