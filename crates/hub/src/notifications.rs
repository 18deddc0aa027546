// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing notifications held in memory and mirrored onto the bus.

use chrono::DateTime;
use nanoid::nanoid;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wh_bus::MessageBus;
use wh_core::{BusMessage, Clock, SystemClock};

pub const PUBLISHED: &str = "notifications.event.published";
pub const DELETED: &str = "notifications.event.deleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Information,
    Warning,
    Error,
}

impl NotificationKind {
    fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Information => "information",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub uid: String,
    pub kind: NotificationKind,
    pub message: String,
    /// RFC3339 publish time
    pub timestamp: String,
}

pub struct NotificationsService<C: Clock = SystemClock> {
    notifications: Mutex<Vec<Notification>>,
    bus: Arc<MessageBus<C>>,
    clock: C,
}

impl<C: Clock> NotificationsService<C> {
    pub fn new(bus: Arc<MessageBus<C>>, clock: C) -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            bus,
            clock,
        }
    }

    /// Append a notification and mirror it onto the bus; returns its uid.
    pub fn publish(&self, kind: NotificationKind, message: impl Into<String>) -> String {
        let uid = nanoid!();
        let message = message.into();
        let timestamp = DateTime::from_timestamp_millis(self.clock.epoch_ms() as i64)
            .unwrap_or_default()
            .to_rfc3339();

        let notification = Notification {
            uid: uid.clone(),
            kind,
            message: message.clone(),
            timestamp,
        };
        self.notifications.lock().push(notification);

        self.bus.publish(
            BusMessage::of_type(PUBLISHED)
                .with("notification_uid", uid.as_str())
                .with("kind", kind.as_str())
                .with("message", message),
        );
        uid
    }

    /// Newest last, in publish order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Remove by uid; unknown uids are a no-op. Returns whether anything
    /// was removed.
    pub fn delete(&self, uid: &str) -> bool {
        let removed = {
            let mut notifications = self.notifications.lock();
            let before = notifications.len();
            notifications.retain(|n| n.uid != uid);
            notifications.len() != before
        };
        if removed {
            self.bus
                .publish(BusMessage::of_type(DELETED).with("notification_uid", uid));
        }
        removed
    }
}

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;
