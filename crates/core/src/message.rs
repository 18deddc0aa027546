// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus message and filter types.
//!
//! A message is a JSON object with two privileged keys: `type` (the routing
//! key) and `timestamp` (epoch milliseconds, assigned by the bus). All other
//! keys are opaque payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Routing key of a message.
pub const KEY_TYPE: &str = "type";
/// Publish time in epoch milliseconds, assigned by the bus.
pub const KEY_TIMESTAMP: &str = "timestamp";

/// An immutable JSON-shaped record carried by the message bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusMessage(Map<String, Value>);

impl BusMessage {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// A message with only its routing key set.
    pub fn of_type(message_type: &str) -> Self {
        let mut map = Map::new();
        map.insert(KEY_TYPE.to_string(), Value::String(message_type.to_string()));
        Self(map)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn message_type(&self) -> Option<&str> {
        self.0.get(KEY_TYPE).and_then(Value::as_str)
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.0.get(KEY_TIMESTAMP).and_then(Value::as_u64)
    }

    pub fn set_timestamp(&mut self, epoch_ms: u64) {
        self.0.insert(KEY_TIMESTAMP.to_string(), Value::from(epoch_ms));
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for BusMessage {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A conjunction of required key/value equalities.
///
/// A message matches when every key in the filter is present in the message
/// with a deep-equal value. The empty filter matches every message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusFilter(Map<String, Value>);

impl BusFilter {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// A filter requiring only the routing key.
    pub fn of_type(message_type: &str) -> Self {
        let mut map = Map::new();
        map.insert(KEY_TYPE.to_string(), Value::String(message_type.to_string()));
        Self(map)
    }

    /// Builder-style constraint.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn matches(&self, message: &BusMessage) -> bool {
        self.0
            .iter()
            .all(|(key, want)| message.get(key) == Some(want))
    }

    /// Disjunction over a filter list: true when any filter matches.
    ///
    /// An empty list matches nothing.
    pub fn any_match(filters: &[BusFilter], message: &BusMessage) -> bool {
        filters.iter().any(|f| f.matches(message))
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
