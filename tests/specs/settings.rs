//! Setting-change specs: event ordering, coalescing, long-poll observation.

use crate::prelude::*;
use serde_json::json;
use std::time::Duration;
use wh_core::BusFilter;

#[test]
fn setting_change_emits_one_ordered_event_pair() {
    let hub = Hub::start();
    let events = hub.events();

    hub.components.register("lamp.1", json!({})).unwrap();
    hub.components
        .set_setting("lamp.1", "brightness", json!(50))
        .unwrap();

    let seen = events.drain();
    let types: Vec<_> = seen.iter().filter_map(|m| m.message_type()).collect();
    assert_eq!(
        types,
        vec![
            "component_registry.event.component_registered",
            "component_registry.event.setting_changed",
        ]
    );
    assert_eq!(seen[0].get("component_uid"), Some(&json!("lamp.1")));
    assert_eq!(seen[1].get("setting_uid"), Some(&json!("brightness")));
    assert_eq!(seen[1].get("old_value"), Some(&json!(null)));
    assert_eq!(seen[1].get("new_value"), Some(&json!(50)));

    // The registry answers the committed value
    assert_eq!(
        hub.components.setting("lamp.1", "brightness").unwrap(),
        json!(50)
    );

    // And the settings document on disk matches
    let on_disk: Option<serde_json::Value> = hub
        .storage
        .try_read(&["Components", "lamp.1", "settings.json"])
        .unwrap();
    assert_eq!(on_disk, Some(json!({"brightness": 50})));
}

#[test]
fn equal_setting_write_publishes_nothing() {
    let hub = Hub::start();
    hub.components.register("lamp.1", json!({})).unwrap();
    hub.components
        .set_setting("lamp.1", "brightness", json!(50))
        .unwrap();

    let events = hub.events();
    hub.components
        .set_setting("lamp.1", "brightness", json!(50))
        .unwrap();

    assert!(events.drain().is_empty());
    let on_disk: Option<serde_json::Value> = hub
        .storage
        .try_read(&["Components", "lamp.1", "settings.json"])
        .unwrap();
    assert_eq!(on_disk, Some(json!({"brightness": 50})));
}

#[tokio::test]
async fn long_poll_observes_a_concurrent_setting_change() {
    let hub = Hub::start();
    hub.components.register("lamp.1", json!({})).unwrap();

    let writer = std::sync::Arc::clone(&hub.components);
    let write = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        writer
            .set_setting("lamp.1", "brightness", json!(75))
            .unwrap();
    });

    let got = hub
        .bus
        .wait_for(
            vec![BusFilter::of_type("component_registry.event.setting_changed")],
            Duration::from_secs(5),
            None,
        )
        .await;
    write.await.unwrap();

    assert_eq!(got.len(), 1);
    assert_eq!(got[0].get("component_uid"), Some(&json!("lamp.1")));
    assert_eq!(got[0].get("setting_uid"), Some(&json!("brightness")));
    assert_eq!(got[0].get("old_value"), Some(&json!(null)));
    assert_eq!(got[0].get("new_value"), Some(&json!(75)));
}

#[tokio::test]
async fn long_poll_with_no_match_times_out_between_one_and_two_seconds() {
    let hub = Hub::start();
    let started = std::time::Instant::now();

    let got = hub
        .bus
        .wait_for(
            vec![BusFilter::of_type("nothing.ever")],
            Duration::from_secs(1),
            None,
        )
        .await;

    let elapsed = started.elapsed();
    assert!(got.is_empty());
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(2));
}
