//! Per-key table of last admission times.
//!
//! The table itself is not synchronized; `KeyedThrottle` owns it behind its
//! single lock.

use crate::domain::window::ThrottleWindow;
use ahash::RandomState;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

/// Map from key to the instant it was last admitted.
#[derive(Debug, Clone)]
pub struct EntryTable<K>
where
    K: Eq + Hash,
{
    entries: HashMap<K, Instant, RandomState>,
}

impl<K> EntryTable<K>
where
    K: Eq + Hash,
{
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Check `key` against `window` and admit it if nothing suppresses it.
    ///
    /// Returns `true` and records `now` as the key's last admission when the
    /// key is unknown or its entry has aged out. Returns `false` and leaves
    /// the entry untouched otherwise.
    pub fn admit(&mut self, key: K, window: ThrottleWindow, now: Instant) -> bool {
        if let Some(&admitted_at) = self.entries.get(&key) {
            if window.suppresses(admitted_at, now) {
                return false;
            }
        }
        self.entries.insert(key, now);
        true
    }

    /// Last admission time for `key`, if it is tracked.
    pub fn last_allowed<Q>(&self, key: &Q) -> Option<Instant>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).copied()
    }

    /// Remove every entry that `window` considers expired at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, window: ThrottleWindow, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, admitted_at| !window.is_expired(*admitted_at, now));
        before - self.entries.len()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> Default for EntryTable<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
