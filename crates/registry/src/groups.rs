// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The component group registry.
//!
//! Shares the component registry's lock discipline. On any committed
//! mutation the group is persisted fully: configuration, settings, and one
//! settings document per association, with stale on-disk association
//! directories pruned by enumeration.

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::warn;
use wh_bus::MessageBus;
use wh_core::{Clock, SystemClock};
use wh_storage::{StorageError, ValueStorage};

use crate::error::{require_uid, RegistryError};
use crate::events;
use crate::events::component_group as event;
use crate::group::{Association, ComponentGroup};
use crate::layout::{DIR_COMPONENTS, DIR_COMPONENT_GROUPS, DIR_MACROS, FILE_CONFIGURATION, FILE_SETTINGS};

/// Which association map an operation targets.
#[derive(Debug, Clone, Copy)]
enum MemberKind {
    Component,
    Macro,
}

impl MemberKind {
    fn dir(self) -> &'static str {
        match self {
            MemberKind::Component => DIR_COMPONENTS,
            MemberKind::Macro => DIR_MACROS,
        }
    }

    fn field(self) -> &'static str {
        match self {
            MemberKind::Component => "component_uid",
            MemberKind::Macro => "macro_uid",
        }
    }

    fn uid_label(self) -> &'static str {
        match self {
            MemberKind::Component => "component",
            MemberKind::Macro => "macro",
        }
    }

    fn assigned_event(self) -> &'static str {
        match self {
            MemberKind::Component => event::COMPONENT_ASSIGNED,
            MemberKind::Macro => event::MACRO_ASSIGNED,
        }
    }

    fn unassigned_event(self) -> &'static str {
        match self {
            MemberKind::Component => event::COMPONENT_UNASSIGNED,
            MemberKind::Macro => event::MACRO_UNASSIGNED,
        }
    }

    fn map(self, group: &mut ComponentGroup) -> &mut BTreeMap<String, Association> {
        match self {
            MemberKind::Component => &mut group.components,
            MemberKind::Macro => &mut group.macros,
        }
    }
}

pub struct ComponentGroupRegistry<C: Clock = SystemClock> {
    groups: Mutex<HashMap<String, ComponentGroup>>,
    storage: Arc<ValueStorage>,
    bus: Arc<MessageBus<C>>,
}

impl<C: Clock> ComponentGroupRegistry<C> {
    pub fn new(storage: Arc<ValueStorage>, bus: Arc<MessageBus<C>>) -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            storage,
            bus,
        }
    }

    /// Load every group directory from disk, skipping (and logging) the
    /// ones that fail to initialize.
    pub fn initialize_all(&self) -> Result<(), RegistryError> {
        for uid in self
            .storage
            .enumerate_directories("*", &[DIR_COMPONENT_GROUPS])?
        {
            if let Err(e) = self.initialize(&uid) {
                warn!(component_group_uid = %uid, error = %e, "component group failed to initialize");
            }
        }
        Ok(())
    }

    /// Build a group from its on-disk documents, including one association
    /// per `Components/`/`Macros/` sub-directory.
    pub fn initialize(&self, uid: &str) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;

        let configuration: Value = self
            .storage
            .try_read(&[DIR_COMPONENT_GROUPS, uid, FILE_CONFIGURATION])?
            .unwrap_or(Value::Object(Map::new()));
        let settings: Map<String, Value> = self
            .storage
            .try_read(&[DIR_COMPONENT_GROUPS, uid, FILE_SETTINGS])?
            .unwrap_or_default();

        let mut group = ComponentGroup::new(uid, configuration);
        group.settings = settings;
        group.components = self.read_associations(uid, MemberKind::Component)?;
        group.macros = self.read_associations(uid, MemberKind::Macro)?;

        self.groups.lock().insert(uid.to_string(), group);
        self.bus
            .publish(events::group_lifecycle(event::INITIALIZED, uid));
        Ok(())
    }

    fn read_associations(
        &self,
        uid: &str,
        kind: MemberKind,
    ) -> Result<BTreeMap<String, Association>, RegistryError> {
        let mut associations = BTreeMap::new();
        for member in self
            .storage
            .enumerate_directories("*", &[DIR_COMPONENT_GROUPS, uid, kind.dir()])?
        {
            let settings: Map<String, Value> = self
                .storage
                .try_read(&[DIR_COMPONENT_GROUPS, uid, kind.dir(), member.as_str(), FILE_SETTINGS])?
                .unwrap_or_default();
            associations.insert(member, Association { settings });
        }
        Ok(associations)
    }

    pub fn uids(&self) -> Vec<String> {
        let mut uids: Vec<String> = self.groups.lock().keys().cloned().collect();
        uids.sort();
        uids
    }

    pub fn groups(&self) -> Vec<ComponentGroup> {
        let mut all: Vec<ComponentGroup> = self.groups.lock().values().cloned().collect();
        all.sort_by(|a, b| a.uid.cmp(&b.uid));
        all
    }

    pub fn try_get(&self, uid: &str) -> Result<Option<ComponentGroup>, RegistryError> {
        require_uid(uid, "component group")?;
        Ok(self.groups.lock().get(uid).cloned())
    }

    pub fn get(&self, uid: &str) -> Result<ComponentGroup, RegistryError> {
        self.try_get(uid)?
            .ok_or_else(|| RegistryError::ComponentGroupNotFound(uid.to_string()))
    }

    /// Create or overwrite a group, persist it fully, publish
    /// `component_group_registered`.
    pub fn register(&self, uid: &str, configuration: Value) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;

        let mut table = self.groups.lock();
        let group = ComponentGroup::new(uid, configuration);
        self.save_group(&group)?;
        table.insert(uid.to_string(), group);

        self.bus
            .publish(events::group_lifecycle(event::REGISTERED, uid));
        Ok(())
    }

    /// Remove a group and its directory, publishing
    /// `component_group_deleted`.
    pub fn delete(&self, uid: &str) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;

        let mut table = self.groups.lock();
        let removed = table
            .remove(uid)
            .ok_or_else(|| RegistryError::ComponentGroupNotFound(uid.to_string()))?;

        if let Err(e) = self
            .storage
            .delete_directory(&[DIR_COMPONENT_GROUPS, uid])
        {
            table.insert(uid.to_string(), removed);
            return Err(e.into());
        }

        self.bus
            .publish(events::group_lifecycle(event::DELETED, uid));
        Ok(())
    }

    pub fn setting(&self, uid: &str, setting_uid: &str) -> Result<Value, RegistryError> {
        require_uid(setting_uid, "setting")?;
        Ok(self.get(uid)?.setting(setting_uid))
    }

    /// Set a group setting; deep-equal writes are coalesced. The published
    /// event carries the stored value in `new_value`.
    pub fn set_setting(
        &self,
        uid: &str,
        setting_uid: &str,
        value: Value,
    ) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;
        require_uid(setting_uid, "setting")?;

        let mut table = self.groups.lock();
        let group = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentGroupNotFound(uid.to_string()))?;

        let old_value = group.setting(setting_uid);
        if old_value == value {
            return Ok(());
        }

        let prior = group.clone();
        group.settings.insert(setting_uid.to_string(), value.clone());
        if let Err(e) = self.save_group(group) {
            *group = prior;
            return Err(e.into());
        }

        self.bus.publish(events::group_setting_changed(
            uid,
            setting_uid,
            old_value,
            value,
        ));
        Ok(())
    }

    /// Remove a group setting. Absent keys are a no-op; otherwise the
    /// removal persists and publishes `setting_changed` with a null
    /// `new_value`.
    pub fn remove_setting(&self, uid: &str, setting_uid: &str) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;
        require_uid(setting_uid, "setting")?;

        let mut table = self.groups.lock();
        let group = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentGroupNotFound(uid.to_string()))?;

        if !group.settings.contains_key(setting_uid) {
            return Ok(());
        }

        let prior = group.clone();
        let old_value = group
            .settings
            .remove(setting_uid)
            .unwrap_or(Value::Null);
        if let Err(e) = self.save_group(group) {
            *group = prior;
            return Err(e.into());
        }

        self.bus.publish(events::group_setting_changed(
            uid,
            setting_uid,
            old_value,
            Value::Null,
        ));
        Ok(())
    }

    pub fn assign_component(&self, uid: &str, component_uid: &str) -> Result<(), RegistryError> {
        self.assign_member(MemberKind::Component, uid, component_uid)
    }

    pub fn unassign_component(&self, uid: &str, component_uid: &str) -> Result<(), RegistryError> {
        self.unassign_member(MemberKind::Component, uid, component_uid)
    }

    pub fn assign_macro(&self, uid: &str, macro_uid: &str) -> Result<(), RegistryError> {
        self.assign_member(MemberKind::Macro, uid, macro_uid)
    }

    pub fn unassign_macro(&self, uid: &str, macro_uid: &str) -> Result<(), RegistryError> {
        self.unassign_member(MemberKind::Macro, uid, macro_uid)
    }

    pub fn component_setting(
        &self,
        uid: &str,
        component_uid: &str,
        setting_uid: &str,
    ) -> Result<Value, RegistryError> {
        self.member_setting(MemberKind::Component, uid, component_uid, setting_uid)
    }

    pub fn set_component_setting(
        &self,
        uid: &str,
        component_uid: &str,
        setting_uid: &str,
        value: Value,
    ) -> Result<(), RegistryError> {
        self.set_member_setting(MemberKind::Component, uid, component_uid, setting_uid, value)
    }

    pub fn remove_component_setting(
        &self,
        uid: &str,
        component_uid: &str,
        setting_uid: &str,
    ) -> Result<(), RegistryError> {
        self.remove_member_setting(MemberKind::Component, uid, component_uid, setting_uid)
    }

    pub fn macro_setting(
        &self,
        uid: &str,
        macro_uid: &str,
        setting_uid: &str,
    ) -> Result<Value, RegistryError> {
        self.member_setting(MemberKind::Macro, uid, macro_uid, setting_uid)
    }

    pub fn set_macro_setting(
        &self,
        uid: &str,
        macro_uid: &str,
        setting_uid: &str,
        value: Value,
    ) -> Result<(), RegistryError> {
        self.set_member_setting(MemberKind::Macro, uid, macro_uid, setting_uid, value)
    }

    pub fn remove_macro_setting(
        &self,
        uid: &str,
        macro_uid: &str,
        setting_uid: &str,
    ) -> Result<(), RegistryError> {
        self.remove_member_setting(MemberKind::Macro, uid, macro_uid, setting_uid)
    }

    /// Insert a default association; already-assigned members are a no-op
    /// with no event.
    fn assign_member(
        &self,
        kind: MemberKind,
        uid: &str,
        member_uid: &str,
    ) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;
        require_uid(member_uid, kind.uid_label())?;

        let mut table = self.groups.lock();
        let group = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentGroupNotFound(uid.to_string()))?;

        if kind.map(group).contains_key(member_uid) {
            return Ok(());
        }

        let prior = group.clone();
        kind.map(group)
            .insert(member_uid.to_string(), Association::default());
        if let Err(e) = self.save_group(group) {
            *group = prior;
            return Err(e.into());
        }

        self.bus.publish(events::group_membership(
            kind.assigned_event(),
            uid,
            kind.field(),
            member_uid,
        ));
        Ok(())
    }

    /// Remove an association; absent members are a no-op with no event.
    fn unassign_member(
        &self,
        kind: MemberKind,
        uid: &str,
        member_uid: &str,
    ) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;
        require_uid(member_uid, kind.uid_label())?;

        let mut table = self.groups.lock();
        let group = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentGroupNotFound(uid.to_string()))?;

        if !kind.map(group).contains_key(member_uid) {
            return Ok(());
        }

        let prior = group.clone();
        kind.map(group).remove(member_uid);
        if let Err(e) = self.save_group(group) {
            *group = prior;
            return Err(e.into());
        }

        self.bus.publish(events::group_membership(
            kind.unassigned_event(),
            uid,
            kind.field(),
            member_uid,
        ));
        Ok(())
    }

    /// Read an association setting. Absent group: not-found. Absent
    /// association or key: JSON null.
    fn member_setting(
        &self,
        kind: MemberKind,
        uid: &str,
        member_uid: &str,
        setting_uid: &str,
    ) -> Result<Value, RegistryError> {
        require_uid(member_uid, kind.uid_label())?;
        require_uid(setting_uid, "setting")?;

        let mut group = self.get(uid)?;
        Ok(kind
            .map(&mut group)
            .get(member_uid)
            .and_then(|a| a.settings.get(setting_uid))
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Set an association setting. Absent association: silent no-op.
    /// Deep-equal writes are coalesced.
    fn set_member_setting(
        &self,
        kind: MemberKind,
        uid: &str,
        member_uid: &str,
        setting_uid: &str,
        value: Value,
    ) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;
        require_uid(member_uid, kind.uid_label())?;
        require_uid(setting_uid, "setting")?;

        let mut table = self.groups.lock();
        let group = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentGroupNotFound(uid.to_string()))?;

        let prior = group.clone();
        let Some(association) = kind.map(group).get_mut(member_uid) else {
            return Ok(());
        };

        let old_value = association
            .settings
            .get(setting_uid)
            .cloned()
            .unwrap_or(Value::Null);
        if old_value == value {
            return Ok(());
        }

        association
            .settings
            .insert(setting_uid.to_string(), value.clone());
        if let Err(e) = self.save_group(group) {
            *group = prior;
            return Err(e.into());
        }

        self.bus.publish(events::association_setting_changed(
            uid,
            kind.field(),
            member_uid,
            setting_uid,
            old_value,
            value,
        ));
        Ok(())
    }

    /// Remove an association setting. Absent association or key: silent
    /// no-op; otherwise remove + persist + `setting_changed` with null
    /// `new_value`.
    fn remove_member_setting(
        &self,
        kind: MemberKind,
        uid: &str,
        member_uid: &str,
        setting_uid: &str,
    ) -> Result<(), RegistryError> {
        require_uid(uid, "component group")?;
        require_uid(member_uid, kind.uid_label())?;
        require_uid(setting_uid, "setting")?;

        let mut table = self.groups.lock();
        let group = table
            .get_mut(uid)
            .ok_or_else(|| RegistryError::ComponentGroupNotFound(uid.to_string()))?;

        let prior = group.clone();
        let Some(association) = kind.map(group).get_mut(member_uid) else {
            return Ok(());
        };
        let Some(old_value) = association.settings.remove(setting_uid) else {
            return Ok(());
        };

        if let Err(e) = self.save_group(group) {
            *group = prior;
            return Err(e.into());
        }

        self.bus.publish(events::association_setting_changed(
            uid,
            kind.field(),
            member_uid,
            setting_uid,
            old_value,
            Value::Null,
        ));
        Ok(())
    }

    /// Persist a group fully: configuration, settings, one settings
    /// document per association, and prune stale association directories.
    fn save_group(&self, group: &ComponentGroup) -> Result<(), StorageError> {
        let uid = group.uid.as_str();
        self.storage.write(
            &group.configuration,
            &[DIR_COMPONENT_GROUPS, uid, FILE_CONFIGURATION],
        )?;
        self.storage
            .write(&group.settings, &[DIR_COMPONENT_GROUPS, uid, FILE_SETTINGS])?;

        self.save_associations(uid, DIR_COMPONENTS, &group.components)?;
        self.save_associations(uid, DIR_MACROS, &group.macros)?;
        Ok(())
    }

    fn save_associations(
        &self,
        uid: &str,
        dir: &str,
        associations: &BTreeMap<String, Association>,
    ) -> Result<(), StorageError> {
        for (member, association) in associations {
            self.storage.write(
                &association.settings,
                &[DIR_COMPONENT_GROUPS, uid, dir, member.as_str(), FILE_SETTINGS],
            )?;
        }
        // Reconcile directories left behind by unassigned members
        for stale in self
            .storage
            .enumerate_directories("*", &[DIR_COMPONENT_GROUPS, uid, dir])?
        {
            if !associations.contains_key(&stale) {
                self.storage
                    .delete_directory(&[DIR_COMPONENT_GROUPS, uid, dir, stale.as_str()])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
