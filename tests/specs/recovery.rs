//! Crash-recovery specs: a restarted hub reloads the persisted tree.

use crate::prelude::*;
use serde_json::json;

#[test]
fn restart_reloads_components_and_groups() {
    let mut hub = Hub::start();
    hub.components.register("lamp.1", json!({})).unwrap();
    hub.components
        .set_setting("lamp.1", "brightness", json!(50))
        .unwrap();
    hub.groups.register("room.kitchen", json!({})).unwrap();
    hub.groups.assign_component("room.kitchen", "lamp.1").unwrap();

    hub = hub.restart();

    assert_eq!(
        hub.components
            .get("lamp.1")
            .unwrap()
            .settings
            .get("brightness"),
        Some(&json!(50))
    );
    assert!(hub
        .groups
        .get("room.kitchen")
        .unwrap()
        .components
        .contains_key("lamp.1"));
}

#[test]
fn restart_drops_live_status() {
    let mut hub = Hub::start();
    hub.components.register("motion.hall", json!({})).unwrap();
    hub.components
        .set_status("motion.hall", "presence", json!(true))
        .unwrap();

    hub = hub.restart();
    assert!(hub.components.get("motion.hall").unwrap().status.is_empty());
}

#[test]
fn deleting_a_component_leaves_group_associations_in_place() {
    let mut hub = Hub::start();
    hub.components.register("lamp.1", json!({})).unwrap();
    hub.groups.register("room.kitchen", json!({})).unwrap();
    hub.groups.assign_component("room.kitchen", "lamp.1").unwrap();

    // Associations are weak references: no cascade on component delete
    hub.components.delete("lamp.1").unwrap();
    assert!(hub
        .groups
        .get("room.kitchen")
        .unwrap()
        .components
        .contains_key("lamp.1"));

    hub = hub.restart();
    assert!(hub
        .groups
        .get("room.kitchen")
        .unwrap()
        .components
        .contains_key("lamp.1"));
}

#[test]
fn round_trip_preserves_association_settings() {
    let mut hub = Hub::start();
    hub.groups.register("room.kitchen", json!({"kind": "area"})).unwrap();
    hub.groups.assign_component("room.kitchen", "lamp.1").unwrap();
    hub.groups
        .set_component_setting("room.kitchen", "lamp.1", "role", json!("main"))
        .unwrap();
    hub.groups.assign_macro("room.kitchen", "scene.movie").unwrap();
    hub.groups
        .set_macro_setting("room.kitchen", "scene.movie", "delay", json!(10))
        .unwrap();

    let before = hub.groups.get("room.kitchen").unwrap();
    hub = hub.restart();
    assert_eq!(hub.groups.get("room.kitchen").unwrap(), before);
}
