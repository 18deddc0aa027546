// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio_util::sync::CancellationToken;
use wh_bus::{BusOptions, QueueSubscription};
use wh_core::{BusFilter, FakeClock, OpsCounter};

fn service() -> (NotificationsService<FakeClock>, QueueSubscription, FakeClock) {
    let clock = FakeClock::new();
    let bus = Arc::new(MessageBus::new(
        clock.clone(),
        BusOptions::default(),
        Arc::new(OpsCounter::new("message_bus.messages_published")),
        CancellationToken::new(),
    ));
    let events = bus.subscribe_queue(vec![BusFilter::new()], 100);
    (NotificationsService::new(bus, clock.clone()), events, clock)
}

#[test]
fn publish_appends_and_mirrors_to_the_bus() {
    let (service, events, _clock) = service();
    let uid = service.publish(NotificationKind::Warning, "battery low");

    let list = service.notifications();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].uid, uid);
    assert_eq!(list[0].kind, NotificationKind::Warning);
    assert_eq!(list[0].message, "battery low");

    let published = events.drain();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].message_type(), Some(PUBLISHED));
    assert_eq!(
        published[0].get("notification_uid"),
        Some(&serde_json::json!(uid))
    );
    assert_eq!(published[0].get("kind"), Some(&serde_json::json!("warning")));
}

#[test]
fn notifications_keep_publish_order() {
    let (service, _events, _clock) = service();
    service.publish(NotificationKind::Information, "one");
    service.publish(NotificationKind::Error, "two");

    let messages: Vec<_> = service
        .notifications()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, vec!["one", "two"]);
}

#[test]
fn delete_is_idempotent() {
    let (service, events, _clock) = service();
    let uid = service.publish(NotificationKind::Information, "hello");
    events.drain();

    assert!(service.delete(&uid));
    assert_eq!(events.drain()[0].message_type(), Some(DELETED));
    assert!(service.notifications().is_empty());

    assert!(!service.delete(&uid));
    assert!(events.drain().is_empty());
}

#[test]
fn timestamps_come_from_the_clock() {
    let (service, _events, clock) = service();
    clock.set_epoch_ms(0);
    service.publish(NotificationKind::Information, "epoch");
    assert!(service.notifications()[0].timestamp.starts_with("1970-01-01"));
}

#[test]
fn kind_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&NotificationKind::Warning).unwrap(),
        "\"warning\""
    );
}
