// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus event types and payload builders for the registries.
//!
//! Every event carries `type`, the relevant uids, and `old_value`/`new_value`
//! where applicable. The bus assigns `timestamp` at publish time.

use serde_json::Value;
use wh_core::BusMessage;

pub mod component {
    pub const REGISTERED: &str = "component_registry.event.component_registered";
    pub const DELETED: &str = "component_registry.event.component_deleted";
    pub const INITIALIZED: &str = "component_registry.event.initialized";
    pub const SETTING_CHANGED: &str = "component_registry.event.setting_changed";
    pub const STATUS_CHANGED: &str = "component_registry.event.status_changed";
}

pub mod component_group {
    pub const REGISTERED: &str = "component_group_registry.event.component_group_registered";
    pub const DELETED: &str = "component_group_registry.event.component_group_deleted";
    pub const INITIALIZED: &str = "component_group_registry.event.initialized";
    pub const SETTING_CHANGED: &str = "component_group_registry.event.setting_changed";
    pub const COMPONENT_ASSIGNED: &str = "component_group_registry.event.component_assigned";
    pub const COMPONENT_UNASSIGNED: &str = "component_group_registry.event.component_unassigned";
    pub const MACRO_ASSIGNED: &str = "component_group_registry.event.macro_assigned";
    pub const MACRO_UNASSIGNED: &str = "component_group_registry.event.macro_unassigned";
}

pub(crate) fn component_lifecycle(event_type: &str, component_uid: &str) -> BusMessage {
    BusMessage::of_type(event_type).with("component_uid", component_uid)
}

pub(crate) fn component_value_changed(
    event_type: &str,
    component_uid: &str,
    key_field: &str,
    key_uid: &str,
    old_value: Value,
    new_value: Value,
) -> BusMessage {
    BusMessage::of_type(event_type)
        .with("component_uid", component_uid)
        .with(key_field, key_uid)
        .with("old_value", old_value)
        .with("new_value", new_value)
}

pub(crate) fn group_lifecycle(event_type: &str, group_uid: &str) -> BusMessage {
    BusMessage::of_type(event_type).with("component_group_uid", group_uid)
}

pub(crate) fn group_membership(event_type: &str, group_uid: &str, member_field: &str, member_uid: &str) -> BusMessage {
    BusMessage::of_type(event_type)
        .with("component_group_uid", group_uid)
        .with(member_field, member_uid)
}

pub(crate) fn group_setting_changed(
    group_uid: &str,
    setting_uid: &str,
    old_value: Value,
    new_value: Value,
) -> BusMessage {
    BusMessage::of_type(component_group::SETTING_CHANGED)
        .with("component_group_uid", group_uid)
        .with("setting_uid", setting_uid)
        .with("old_value", old_value)
        .with("new_value", new_value)
}

/// Association-scoped setting change; `member_field` names the association
/// kind (`component_uid` or `macro_uid`).
pub(crate) fn association_setting_changed(
    group_uid: &str,
    member_field: &str,
    member_uid: &str,
    setting_uid: &str,
    old_value: Value,
    new_value: Value,
) -> BusMessage {
    BusMessage::of_type(component_group::SETTING_CHANGED)
        .with("component_group_uid", group_uid)
        .with(member_field, member_uid)
        .with("setting_uid", setting_uid)
        .with("old_value", old_value)
        .with("new_value", new_value)
}
