// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The component registry.
//!
//! One lock covers the table and the per-component maps. Read paths copy a
//! snapshot out under the lock and return; write paths hold the lock across
//! state-update + storage-write + bus-publish so observers never see events
//! out of order with state. A failed write rolls the in-memory change back
//! and publishes nothing.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use wh_bus::MessageBus;
use wh_core::{Clock, SystemClock};
use wh_storage::ValueStorage;

use crate::component::Component;
use crate::error::{require_uid, RegistryError};
use crate::events;
use crate::events::component as event;
use crate::layout::{DIR_COMPONENTS, FILE_CONFIGURATION, FILE_SETTINGS};

pub struct ComponentRegistry<C: Clock = SystemClock> {
    components: Mutex<HashMap<String, Component>>,
    storage: Arc<ValueStorage>,
    bus: Arc<MessageBus<C>>,
}

impl<C: Clock> ComponentRegistry<C> {
    pub fn new(storage: Arc<ValueStorage>, bus: Arc<MessageBus<C>>) -> Self {
        Self {
            components: Mutex::new(HashMap::new()),
            storage,
            bus,
        }
    }

    /// Load every component directory from disk, skipping (and logging)
    /// the ones that fail to initialize.
    pub fn initialize_all(&self) -> Result<(), RegistryError> {
        for uid in self
            .storage
            .enumerate_directories("*", &[DIR_COMPONENTS])?
        {
            if let Err(e) = self.initialize(&uid) {
                warn!(component_uid = %uid, error = %e, "component failed to initialize");
            }
        }
        Ok(())
    }

    /// Build a component from its on-disk configuration and settings.
    ///
    /// A failure leaves the entity absent.
    pub fn initialize(&self, uid: &str) -> Result<(), RegistryError> {
        require_uid(uid, "component")?;

        let configuration: Value = self
            .storage
            .try_read(&[DIR_COMPONENTS, uid, FILE_CONFIGURATION])?
            .unwrap_or(Value::Object(Map::new()));
        let settings: Map<String, Value> = self
            .storage
            .try_read(&[DIR_COMPONENTS, uid, FILE_SETTINGS])?
            .unwrap_or_default();

        let mut table = self.components.lock();
        let mut component = Component::new(uid, configuration);
        component.settings = settings;
        table.insert(uid.to_string(), component);

        self.bus
            .publish(events::component_lifecycle(event::INITIALIZED, uid));
        Ok(())
    }

    pub fn uids(&self) -> Vec<String> {
        let mut uids: Vec<String> = self.components.lock().keys().cloned().collect();
        uids.sort();
        uids
    }

    pub fn components(&self) -> Vec<Component> {
        let mut all: Vec<Component> = self.components.lock().values().cloned().collect();
        all.sort_by(|a, b| a.uid.cmp(&b.uid));
        all
    }

    pub fn try_get(&self, uid: &str) -> Result<Option<Component>, RegistryError> {
        require_uid(uid, "component")?;
        Ok(self.components.lock().get(uid).cloned())
    }

    pub fn get(&self, uid: &str) -> Result<Component, RegistryError> {
        self.try_get(uid)?
            .ok_or_else(|| RegistryError::ComponentNotFound(uid.to_string()))
    }

    /// Create or overwrite a component: persist the configuration, reset
    /// settings and status, publish `component_registered`.
    pub fn register(&self, uid: &str, configuration: Value) -> Result<(), RegistryError> {
        require_uid(uid, "component")?;

        let mut table = self.components.lock();
        let previous = table.insert(uid.to_string(), Component::new(uid, configuration.clone()));

        let written = self
            .storage
            .write(&configuration, &[DIR_COMPONENTS, uid, FILE_CONFIGURATION])
            .and_then(|()| {
                self.storage
                    .write(&Map::<String, Value>::new(), &[DIR_COMPONENTS, uid, FILE_SETTINGS])
            });
        if let Err(e) = written {
            restore(&mut table, uid, previous);
            return Err(e.into());
        }

        self.bus
            .publish(events::component_lifecycle(event::REGISTERED, uid));
        Ok(())
    }

    /// Remove a component and its directory, publishing `component_deleted`.
    pub fn delete(&self, uid: &str) -> Result<(), RegistryError> {
        require_uid(uid, "component")?;

        let mut table = self.components.lock();
        let removed = table
            .remove(uid)
            .ok_or_else(|| RegistryError::ComponentNotFound(uid.to_string()))?;

        if let Err(e) = self.storage.delete_directory(&[DIR_COMPONENTS, uid]) {
            table.insert(uid.to_string(), removed);
            return Err(e.into());
        }

        self.bus
            .publish(events::component_lifecycle(event::DELETED, uid));
        Ok(())
    }

    pub fn setting(&self, uid: &str, setting_uid: &str) -> Result<Value, RegistryError> {
        require_uid(setting_uid, "setting")?;
        Ok(self.get(uid)?.setting(setting_uid))
    }

    /// Set a persisted setting. Writes that deep-equal the current value
    /// are coalesced: no disk write, no event.
    pub fn set_setting(
        &self,
        uid: &str,
        setting_uid: &str,
        value: Value,
    ) -> Result<(), RegistryError> {
        require_uid(uid, "component")?;
        require_uid(setting_uid, "setting")?;

        let mut table = self.components.lock();
        let component = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentNotFound(uid.to_string()))?;

        let prior = component.settings.get(setting_uid).cloned();
        let old_value = prior.clone().unwrap_or(Value::Null);
        if old_value == value {
            return Ok(());
        }

        component
            .settings
            .insert(setting_uid.to_string(), value.clone());

        if let Err(e) = self
            .storage
            .write(&component.settings, &[DIR_COMPONENTS, uid, FILE_SETTINGS])
        {
            restore_key(&mut component.settings, setting_uid, prior);
            return Err(e.into());
        }

        self.bus.publish(events::component_value_changed(
            event::SETTING_CHANGED,
            uid,
            "setting_uid",
            setting_uid,
            old_value,
            value,
        ));
        Ok(())
    }

    /// Remove a persisted setting. Absent keys are a no-op; otherwise the
    /// change persists and publishes `setting_changed` with a null
    /// `new_value`.
    pub fn remove_setting(&self, uid: &str, setting_uid: &str) -> Result<(), RegistryError> {
        require_uid(uid, "component")?;
        require_uid(setting_uid, "setting")?;

        let mut table = self.components.lock();
        let component = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentNotFound(uid.to_string()))?;

        let Some(old_value) = component.settings.remove(setting_uid) else {
            return Ok(());
        };

        if let Err(e) = self
            .storage
            .write(&component.settings, &[DIR_COMPONENTS, uid, FILE_SETTINGS])
        {
            component
                .settings
                .insert(setting_uid.to_string(), old_value);
            return Err(e.into());
        }

        self.bus.publish(events::component_value_changed(
            event::SETTING_CHANGED,
            uid,
            "setting_uid",
            setting_uid,
            old_value,
            Value::Null,
        ));
        Ok(())
    }

    pub fn status(&self, uid: &str, status_uid: &str) -> Result<Value, RegistryError> {
        require_uid(status_uid, "status")?;
        Ok(self.get(uid)?.status_value(status_uid))
    }

    /// Set a live status value. Status never touches disk; deep-equal
    /// writes are coalesced.
    pub fn set_status(
        &self,
        uid: &str,
        status_uid: &str,
        value: Value,
    ) -> Result<(), RegistryError> {
        require_uid(uid, "component")?;
        require_uid(status_uid, "status")?;

        let mut table = self.components.lock();
        let component = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentNotFound(uid.to_string()))?;

        let old_value = component.status_value(status_uid);
        if old_value == value {
            return Ok(());
        }
        component.status.insert(status_uid.to_string(), value.clone());

        self.bus.publish(events::component_value_changed(
            event::STATUS_CHANGED,
            uid,
            "status_uid",
            status_uid,
            old_value,
            value,
        ));
        Ok(())
    }

    /// Remove a status value; absent keys are a no-op.
    pub fn remove_status(&self, uid: &str, status_uid: &str) -> Result<(), RegistryError> {
        require_uid(uid, "component")?;
        require_uid(status_uid, "status")?;

        let mut table = self.components.lock();
        let component = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentNotFound(uid.to_string()))?;

        let Some(old_value) = component.status.remove(status_uid) else {
            return Ok(());
        };

        self.bus.publish(events::component_value_changed(
            event::STATUS_CHANGED,
            uid,
            "status_uid",
            status_uid,
            old_value,
            Value::Null,
        ));
        Ok(())
    }
}

fn restore(table: &mut HashMap<String, Component>, uid: &str, previous: Option<Component>) {
    match previous {
        Some(component) => {
            table.insert(uid.to_string(), component);
        }
        None => {
            table.remove(uid);
        }
    }
}

fn restore_key(map: &mut Map<String, Value>, key: &str, previous: Option<Value>) {
    match previous {
        Some(value) => {
            map.insert(key.to_string(), value);
        }
        None => {
            map.remove(key);
        }
    }
}

#[cfg(test)]
#[path = "components_tests.rs"]
mod tests;
