// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named system gauges: constants or zero-arg providers.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

enum Provider {
    Constant(Value),
    Dynamic(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl Provider {
    fn evaluate(&self) -> Value {
        match self {
            Provider::Constant(value) => value.clone(),
            Provider::Dynamic(f) => f(),
        }
    }
}

/// Mapping of status names to value providers; snapshots are atomic with
/// respect to registration.
#[derive(Default)]
pub struct SystemStatusService {
    providers: Mutex<HashMap<String, Provider>>,
}

impl SystemStatusService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constant value.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.providers
            .lock()
            .insert(name.to_string(), Provider::Constant(value.into()));
    }

    /// Register a zero-arg provider evaluated at snapshot time.
    pub fn set_provider<F>(&self, name: &str, provider: F)
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.providers
            .lock()
            .insert(name.to_string(), Provider::Dynamic(Arc::new(provider)));
    }

    /// Evaluate one gauge; absent names read as JSON null.
    pub fn get(&self, name: &str) -> Value {
        self.providers
            .lock()
            .get(name)
            .map(Provider::evaluate)
            .unwrap_or(Value::Null)
    }

    pub fn delete(&self, name: &str) {
        self.providers.lock().remove(name);
    }

    /// Evaluate every gauge under the lock.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.providers
            .lock()
            .iter()
            .map(|(name, provider)| (name.clone(), provider.evaluate()))
            .collect()
    }
}

#[cfg(test)]
#[path = "system_status_tests.rs"]
mod tests;
