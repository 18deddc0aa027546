// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription kinds: synchronous push callbacks and bounded long-poll
//! queues.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use wh_core::{BusFilter, BusMessage};

pub(crate) type PushCallback = Arc<dyn Fn(&BusMessage) + Send + Sync>;

pub(crate) enum Sink {
    Push(PushCallback),
    Queue(Arc<PollQueue>),
}

pub(crate) struct Subscription {
    pub filters: Vec<BusFilter>,
    pub sink: Sink,
}

/// Bounded FIFO buffer backing one long-poll subscription.
///
/// Lifecycle: open → (messages queued / drained) → closed. A closed queue
/// rejects further enqueues silently; closing wakes any pending waiter.
pub struct PollQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

struct QueueState {
    items: VecDeque<BusMessage>,
    capacity: usize,
    overflow: u64,
    closed: bool,
    last_activity: Instant,
}

impl PollQueue {
    pub(crate) fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                capacity: capacity.max(1),
                overflow: 0,
                closed: false,
                last_activity: Instant::now(),
            }),
            notify: Notify::new(),
        })
    }

    /// Enqueue a message. At capacity the oldest queued message is dropped
    /// and the overflow counter advances; the publisher never blocks.
    pub(crate) fn push(&self, message: BusMessage) {
        {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            if state.items.len() == state.capacity {
                state.items.pop_front();
                state.overflow += 1;
            }
            state.items.push_back(message);
        }
        self.notify.notify_one();
    }

    /// Take everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<BusMessage> {
        let mut state = self.state.lock();
        state.last_activity = Instant::now();
        state.items.drain(..).collect()
    }

    /// Close the queue: drop anything queued, reject further enqueues, and
    /// wake a pending waiter, which observes an empty drain.
    pub(crate) fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
            state.items.clear();
        }
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Messages dropped to keep the queue within capacity.
    pub fn overflow(&self) -> u64 {
        self.state.lock().overflow
    }

    /// Time since the queue was created or last drained.
    pub(crate) fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.state.lock().last_activity)
    }

    /// Resolves once a message arrives or the queue closes.
    pub(crate) async fn notified(&self) {
        self.notify.notified().await;
    }
}

/// Handle to a long-poll subscription: its uid plus the shared queue.
pub struct QueueSubscription {
    pub uid: String,
    pub(crate) queue: Arc<PollQueue>,
}

impl QueueSubscription {
    pub fn drain(&self) -> Vec<BusMessage> {
        self.queue.drain()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    pub fn overflow(&self) -> u64 {
        self.queue.overflow()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
