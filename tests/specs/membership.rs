//! Group membership specs: idempotent assign/unassign.

use crate::prelude::*;
use serde_json::json;

#[test]
fn assign_and_unassign_are_idempotent() {
    let hub = Hub::start();
    hub.groups.register("room.kitchen", json!({})).unwrap();

    let events = hub.events();
    hub.groups.assign_component("room.kitchen", "lamp.1").unwrap();
    hub.groups.assign_component("room.kitchen", "lamp.1").unwrap();

    let assigned = events.drain();
    assert_eq!(assigned.len(), 1);
    assert_eq!(
        assigned[0].message_type(),
        Some("component_group_registry.event.component_assigned")
    );
    assert_eq!(assigned[0].get("component_uid"), Some(&json!("lamp.1")));
    assert_eq!(
        assigned[0].get("component_group_uid"),
        Some(&json!("room.kitchen"))
    );

    hub.groups
        .unassign_component("room.kitchen", "lamp.1")
        .unwrap();
    hub.groups
        .unassign_component("room.kitchen", "lamp.1")
        .unwrap();

    let unassigned = events.drain();
    assert_eq!(unassigned.len(), 1);
    assert_eq!(
        unassigned[0].message_type(),
        Some("component_group_registry.event.component_unassigned")
    );
}

#[test]
fn group_setting_event_carries_the_stored_value() {
    let hub = Hub::start();
    hub.groups.register("room.kitchen", json!({})).unwrap();
    hub.groups
        .set_setting("room.kitchen", "scene", json!("dim"))
        .unwrap();

    let events = hub.events();
    hub.groups
        .set_setting("room.kitchen", "scene", json!("movie"))
        .unwrap();

    let seen = events.drain();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("old_value"), Some(&json!("dim")));
    assert_eq!(seen[0].get("new_value"), Some(&json!("movie")));
}
