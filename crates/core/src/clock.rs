//! Injectable time source and an interval-poll change detector.
//!
//! Background jobs take a [`Clock`] instead of calling `Utc::now()` so the
//! inactivity window can be tested against fixed instants.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use chrono::{Duration, Utc};

use crate::types::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/* --------------------------------------------------------------------------
Change detection
-------------------------------------------------------------------------- */

/// Remembers the last value seen per key and reports when it changes.
///
/// The first observation of a key counts as a change.
#[derive(Debug)]
pub struct ChangeDetector<K, V> {
    seen: HashMap<K, V>,
}

impl<K: Eq + Hash, V: PartialEq> ChangeDetector<K, V> {
    pub fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    /// Record `value` for `key`, returning `true` if it differs from the
    /// previous observation.
    pub fn observe(&mut self, key: K, value: V) -> bool {
        match self.seen.get(&key) {
            Some(previous) if *previous == value => false,
            _ => {
                self.seen.insert(key, value);
                true
            }
        }
    }

    /// Drop keys that no longer exist upstream.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.seen.retain(|k, _| keep(k));
    }

    /// Forget a key so its next observation counts as a change.
    pub fn forget(&mut self, key: &K) {
        self.seen.remove(key);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<K: Eq + Hash, V: PartialEq> Default for ChangeDetector<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
