// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

#[test]
fn constants_and_providers_both_snapshot() {
    let status = SystemStatusService::new();
    status.set("wirehome.version", "0.2.0");

    let hits = Arc::new(AtomicU64::new(7));
    let gauge = Arc::clone(&hits);
    status.set_provider("bus.subscriptions", move || {
        json!(gauge.load(Ordering::Relaxed))
    });

    let snapshot = status.snapshot();
    assert_eq!(snapshot.get("wirehome.version"), Some(&json!("0.2.0")));
    assert_eq!(snapshot.get("bus.subscriptions"), Some(&json!(7)));

    // Providers are re-evaluated per snapshot
    hits.store(9, Ordering::Relaxed);
    assert_eq!(status.get("bus.subscriptions"), json!(9));
}

#[test]
fn absent_names_read_as_null() {
    let status = SystemStatusService::new();
    assert_eq!(status.get("missing"), json!(null));
}

#[test]
fn delete_removes_the_gauge() {
    let status = SystemStatusService::new();
    status.set("x", 1);
    status.delete("x");
    assert_eq!(status.get("x"), json!(null));
    assert!(status.snapshot().is_empty());
}

#[test]
fn set_overwrites_a_provider_with_a_constant() {
    let status = SystemStatusService::new();
    status.set_provider("x", || json!(1));
    status.set("x", 2);
    assert_eq!(status.get("x"), json!(2));
}
