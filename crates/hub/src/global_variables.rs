// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global variables: one persisted name → value map shared by scripts and
//! clients. Follows the registries' setting semantics — deep-equality
//! coalescing, persist before publish, rollback on a failed write.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;
use wh_bus::MessageBus;
use wh_core::{BusMessage, Clock, SystemClock};
use wh_storage::{StorageError, ValueStorage};

pub const VALUE_CHANGED: &str = "global_variables.event.value_changed";
pub const VALUE_REMOVED: &str = "global_variables.event.value_removed";

const DIR_GLOBAL_VARIABLES: &str = "GlobalVariables";
const FILE_GLOBAL_VARIABLES: &str = "GlobalVariables.json";

pub struct GlobalVariablesService<C: Clock = SystemClock> {
    values: Mutex<Map<String, Value>>,
    storage: Arc<ValueStorage>,
    bus: Arc<MessageBus<C>>,
}

impl<C: Clock> GlobalVariablesService<C> {
    pub fn new(storage: Arc<ValueStorage>, bus: Arc<MessageBus<C>>) -> Self {
        Self {
            values: Mutex::new(Map::new()),
            storage,
            bus,
        }
    }

    /// Load the persisted map; a missing document is an empty map.
    pub fn initialize(&self) -> Result<(), StorageError> {
        let values: Map<String, Value> = self
            .storage
            .try_read(&[DIR_GLOBAL_VARIABLES, FILE_GLOBAL_VARIABLES])?
            .unwrap_or_default();
        *self.values.lock() = values;
        Ok(())
    }

    pub fn values(&self) -> Map<String, Value> {
        self.values.lock().clone()
    }

    /// Absent names read as JSON null.
    pub fn value(&self, uid: &str) -> Value {
        self.values.lock().get(uid).cloned().unwrap_or(Value::Null)
    }

    /// Set a variable; deep-equal writes are coalesced.
    pub fn set_value(&self, uid: &str, value: Value) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        let prior = values.get(uid).cloned();
        let old_value = prior.clone().unwrap_or(Value::Null);
        if old_value == value {
            return Ok(());
        }

        values.insert(uid.to_string(), value.clone());
        if let Err(e) = self.persist(&values) {
            match prior {
                Some(v) => values.insert(uid.to_string(), v),
                None => values.remove(uid),
            };
            return Err(e);
        }

        self.bus.publish(
            BusMessage::of_type(VALUE_CHANGED)
                .with("variable_uid", uid)
                .with("old_value", old_value)
                .with("new_value", value),
        );
        Ok(())
    }

    /// Delete a variable; absent names are a no-op.
    pub fn delete_value(&self, uid: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock();
        let Some(old_value) = values.remove(uid) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&values) {
            values.insert(uid.to_string(), old_value);
            return Err(e);
        }

        self.bus.publish(
            BusMessage::of_type(VALUE_REMOVED)
                .with("variable_uid", uid)
                .with("old_value", old_value),
        );
        Ok(())
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), StorageError> {
        self.storage
            .write(values, &[DIR_GLOBAL_VARIABLES, FILE_GLOBAL_VARIABLES])
    }
}

#[cfg(test)]
#[path = "global_variables_tests.rs"]
mod tests;
