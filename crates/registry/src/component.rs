// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The component entity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_enabled() -> bool {
    true
}

/// A controllable device or logical unit.
///
/// `settings` are persisted key/values; `status` holds live readings and is
/// never written to disk; `configuration` is the document loaded from the
/// component's directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub uid: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub configuration: Value,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub status: Map<String, Value>,
}

impl Component {
    pub fn new(uid: impl Into<String>, configuration: Value) -> Self {
        Self {
            uid: uid.into(),
            enabled: true,
            configuration,
            settings: Map::new(),
            status: Map::new(),
        }
    }

    /// Effective setting value; absent keys read as JSON null.
    pub fn setting(&self, setting_uid: &str) -> Value {
        self.settings.get(setting_uid).cloned().unwrap_or(Value::Null)
    }

    /// Effective status value; absent keys read as JSON null.
    pub fn status_value(&self, status_uid: &str) -> Value {
        self.status.get(status_uid).cloned().unwrap_or(Value::Null)
    }
}
