// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;
use wh_bus::{BusOptions, QueueSubscription};
use wh_core::{BusFilter, FakeClock, OpsCounter};

fn service() -> (
    tempfile::TempDir,
    Arc<ValueStorage>,
    Arc<MessageBus<FakeClock>>,
    GlobalVariablesService<FakeClock>,
    QueueSubscription,
) {
    let dir = tempdir().unwrap();
    let storage = Arc::new(ValueStorage::new(dir.path()));
    let bus = Arc::new(MessageBus::new(
        FakeClock::new(),
        BusOptions::default(),
        Arc::new(OpsCounter::new("message_bus.messages_published")),
        CancellationToken::new(),
    ));
    let events = bus.subscribe_queue(vec![BusFilter::new()], 100);
    let service = GlobalVariablesService::new(Arc::clone(&storage), Arc::clone(&bus));
    (dir, storage, bus, service, events)
}

#[test]
fn set_value_persists_and_publishes() {
    let (_dir, storage, _bus, service, events) = service();
    service.set_value("presence", json!("home")).unwrap();

    let published = events.drain();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].message_type(), Some(VALUE_CHANGED));
    assert_eq!(published[0].get("variable_uid"), Some(&json!("presence")));
    assert_eq!(published[0].get("old_value"), Some(&json!(null)));
    assert_eq!(published[0].get("new_value"), Some(&json!("home")));

    let on_disk: Option<serde_json::Value> = storage
        .try_read(&["GlobalVariables", "GlobalVariables.json"])
        .unwrap();
    assert_eq!(on_disk, Some(json!({"presence": "home"})));
}

#[test]
fn equal_writes_are_coalesced() {
    let (_dir, _storage, _bus, service, events) = service();
    service.set_value("presence", json!("home")).unwrap();
    events.drain();

    service.set_value("presence", json!("home")).unwrap();
    assert!(events.drain().is_empty());
}

#[test]
fn delete_publishes_once() {
    let (_dir, _storage, _bus, service, events) = service();
    service.set_value("presence", json!("home")).unwrap();
    events.drain();

    service.delete_value("presence").unwrap();
    let published = events.drain();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].message_type(), Some(VALUE_REMOVED));
    assert_eq!(published[0].get("old_value"), Some(&json!("home")));

    // Absent names are a no-op
    service.delete_value("presence").unwrap();
    assert!(events.drain().is_empty());
    assert_eq!(service.value("presence"), json!(null));
}

#[test]
fn initialize_reloads_the_persisted_map() {
    let (_dir, storage, bus, service, _events) = service();
    service.set_value("presence", json!("home")).unwrap();
    service.set_value("mode", json!({"night": true})).unwrap();

    let reloaded = GlobalVariablesService::new(Arc::clone(&storage), Arc::clone(&bus));
    reloaded.initialize().unwrap();
    assert_eq!(reloaded.values(), service.values());
}
