// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component group and membership association entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A membership edge from a group to a component or macro.
///
/// Carries only per-edge settings; the member itself is referenced by the
/// key in the owning map, so deleting a component never cascades here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Association {
    #[serde(default)]
    pub settings: Map<String, Value>,
}

/// A named collection of components and macros with its own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentGroup {
    pub uid: String,
    #[serde(default)]
    pub configuration: Value,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub components: BTreeMap<String, Association>,
    #[serde(default)]
    pub macros: BTreeMap<String, Association>,
}

impl ComponentGroup {
    pub fn new(uid: impl Into<String>, configuration: Value) -> Self {
        Self {
            uid: uid.into(),
            configuration,
            settings: Map::new(),
            components: BTreeMap::new(),
            macros: BTreeMap::new(),
        }
    }

    /// Effective group setting; absent keys read as JSON null.
    pub fn setting(&self, setting_uid: &str) -> Value {
        self.settings.get(setting_uid).cloned().unwrap_or(Value::Null)
    }
}
