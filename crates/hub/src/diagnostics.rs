// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostics service: OPS counter registry plus the 1 s ticker.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use wh_core::OpsCounter;

/// Registry of operations-per-second counters, reset by a single ticker.
#[derive(Default)]
pub struct DiagnosticsService {
    counters: Mutex<Vec<Arc<OpsCounter>>>,
}

impl DiagnosticsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the counter registered under `uid`, or hand back the existing
    /// one.
    pub fn register_counter(&self, uid: &str) -> Arc<OpsCounter> {
        let mut counters = self.counters.lock();
        if let Some(counter) = counters.iter().find(|c| c.uid() == uid) {
            return Arc::clone(counter);
        }
        let counter = Arc::new(OpsCounter::new(uid));
        counters.push(Arc::clone(&counter));
        counter
    }

    /// Published rates keyed by counter uid.
    pub fn rates(&self) -> Map<String, Value> {
        self.counters
            .lock()
            .iter()
            .map(|c| (c.uid().to_string(), Value::from(c.rate())))
            .collect()
    }

    fn tick_all(&self) {
        for counter in self.counters.lock().iter() {
            counter.tick();
        }
    }

    /// Run the ticker until shutdown: every second, snapshot every counter's
    /// count into its published rate.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => self.tick_all(),
            }
        }
        debug!("diagnostics ticker stopped");
    }
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
