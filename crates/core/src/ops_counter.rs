// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations-per-second counters for the diagnostics ticker.

use std::sync::atomic::{AtomicU64, Ordering};

/// A per-metric operations-per-second gauge.
///
/// `increment` is a lock-free atomic add on the hot path. Once per second
/// the diagnostics ticker calls `tick`, which snapshots the current-second
/// count into the published rate and resets the count to zero.
#[derive(Debug)]
pub struct OpsCounter {
    uid: String,
    current: AtomicU64,
    last_rate: AtomicU64,
}

impl OpsCounter {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            current: AtomicU64::new(0),
            last_rate: AtomicU64::new(0),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn increment(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    /// The rate published by the most recent tick.
    pub fn rate(&self) -> u64 {
        self.last_rate.load(Ordering::Relaxed)
    }

    /// Count accumulated since the last tick.
    pub fn pending(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    /// Snapshot `current` into the published rate and reset it.
    pub fn tick(&self) {
        let count = self.current.swap(0, Ordering::Relaxed);
        self.last_rate.store(count, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[path = "ops_counter_tests.rs"]
mod tests;
