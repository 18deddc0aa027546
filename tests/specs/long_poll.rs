//! Bus delivery specs: ordering, overflow accounting, history replay.

use crate::prelude::*;
use serde_json::json;
use std::time::Duration;
use wh_core::{BusFilter, BusMessage};

#[test]
fn subscribers_agree_on_delivery_order() {
    let hub = Hub::start();
    let first = hub.bus.subscribe_queue(vec![BusFilter::of_type("tick")], 100);
    let second = hub.bus.subscribe_queue(vec![BusFilter::of_type("tick")], 100);

    for n in 0..10u64 {
        hub.bus.publish(BusMessage::of_type("tick").with("n", n));
    }

    let order = |sub: &wh_bus::QueueSubscription| -> Vec<u64> {
        sub.drain()
            .iter()
            .map(|m| m.get("n").unwrap().as_u64().unwrap())
            .collect()
    };
    let expected: Vec<u64> = (0..10).collect();
    assert_eq!(order(&first), expected);
    assert_eq!(order(&second), expected);
}

#[test]
fn overflow_drops_exactly_the_oldest() {
    let hub = Hub::start();
    let sub = hub.bus.subscribe_queue(vec![BusFilter::of_type("tick")], 4);

    for n in 0..7u64 {
        hub.bus.publish(BusMessage::of_type("tick").with("n", n));
    }

    assert_eq!(sub.overflow(), 3);
    let kept: Vec<u64> = sub
        .drain()
        .iter()
        .map(|m| m.get("n").unwrap().as_u64().unwrap())
        .collect();
    assert_eq!(kept, vec![3, 4, 5, 6]);
}

#[tokio::test]
async fn history_replay_covers_a_brief_disconnect() {
    let hub = Hub::start();

    hub.clock.set_epoch_ms(1_000);
    hub.bus.publish(BusMessage::of_type("tick").with("n", 1u64));
    hub.clock.set_epoch_ms(2_000);
    hub.bus.publish(BusMessage::of_type("tick").with("n", 2u64));

    // Client last saw timestamp 1000 and reconnects
    let got = hub
        .bus
        .wait_for(
            vec![BusFilter::of_type("tick")],
            Duration::from_secs(5),
            Some(1_000),
        )
        .await;

    assert_eq!(got.len(), 1);
    assert_eq!(got[0].get("n"), Some(&json!(2)));
}

#[tokio::test]
async fn shutdown_releases_pending_waiters() {
    let hub = Hub::start();
    let bus = std::sync::Arc::clone(&hub.bus);

    let waiter = tokio::spawn(async move {
        bus.wait_for(
            vec![BusFilter::of_type("nothing.ever")],
            Duration::from_secs(30),
            None,
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    hub.shutdown.cancel();
    assert!(waiter.await.unwrap().is_empty());
}
