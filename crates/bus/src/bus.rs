// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message bus proper: subscription table, history ring, long-poll wait.

use nanoid::nanoid;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use wh_core::{BusFilter, BusMessage, Clock, OpsCounter, SystemClock};

use crate::history::HistoryRing;
use crate::subscription::{PollQueue, PushCallback, QueueSubscription, Sink, Subscription};

/// Default capacity of the published-message history ring.
pub const DEFAULT_HISTORY_CAPACITY: usize = 2048;
/// Default capacity of a long-poll subscription queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Tunable bus capacities.
#[derive(Debug, Clone, Copy)]
pub struct BusOptions {
    pub history_capacity: usize,
    pub queue_capacity: usize,
}

impl Default for BusOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// In-process pub/sub router with filter subscriptions and long-poll wait.
///
/// One lock covers the subscription table and the history ring. Long-poll
/// queues are filled under that lock; push callbacks are recorded under it
/// and invoked after release, in recorded order.
pub struct MessageBus<C: Clock = SystemClock> {
    inner: Mutex<Inner>,
    clock: C,
    queue_capacity: usize,
    published: Arc<OpsCounter>,
    shutdown: CancellationToken,
}

struct Inner {
    subscriptions: HashMap<String, Subscription>,
    history: HistoryRing,
    last_timestamp: u64,
}

impl<C: Clock> MessageBus<C> {
    pub fn new(
        clock: C,
        options: BusOptions,
        published: Arc<OpsCounter>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                subscriptions: HashMap::new(),
                history: HistoryRing::new(options.history_capacity),
                last_timestamp: 0,
            }),
            clock,
            queue_capacity: options.queue_capacity.max(1),
            published,
            shutdown,
        }
    }

    /// Publish a message to every matching subscription.
    ///
    /// Stamps the message (non-decreasing across the publish sequence) if
    /// the publisher did not, appends it to the history ring, fills matching
    /// long-poll queues, and then invokes matching push callbacks. A
    /// panicking callback is caught and logged; it never prevents dispatch
    /// to the remaining subscribers.
    pub fn publish(&self, message: BusMessage) {
        let mut message = message;
        let mut callbacks: Vec<PushCallback> = Vec::new();
        {
            let mut inner = self.inner.lock();
            let stamp = self.clock.epoch_ms().max(inner.last_timestamp);
            inner.last_timestamp = stamp;
            if message.timestamp().is_none() {
                message.set_timestamp(stamp);
            }

            inner.history.push(message.clone());

            for sub in inner.subscriptions.values() {
                if !BusFilter::any_match(&sub.filters, &message) {
                    continue;
                }
                match &sub.sink {
                    Sink::Queue(queue) => queue.push(message.clone()),
                    Sink::Push(callback) => callbacks.push(Arc::clone(callback)),
                }
            }
        }

        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(&message))).is_err() {
                warn!(
                    message_type = message.message_type().unwrap_or("?"),
                    "push subscriber panicked during dispatch"
                );
            }
        }

        self.published.increment();
    }

    /// Register a push subscription; the callback runs on the publisher.
    pub fn subscribe<F>(&self, filters: Vec<BusFilter>, callback: F) -> String
    where
        F: Fn(&BusMessage) + Send + Sync + 'static,
    {
        let uid = nanoid!();
        self.inner.lock().subscriptions.insert(
            uid.clone(),
            Subscription {
                filters,
                sink: Sink::Push(Arc::new(callback)),
            },
        );
        uid
    }

    /// Register a long-poll subscription with a fresh bounded queue.
    pub fn subscribe_queue(&self, filters: Vec<BusFilter>, capacity: usize) -> QueueSubscription {
        self.subscribe_queue_since(filters, capacity, None)
    }

    /// As `subscribe_queue`, seeding the queue with already-matching history
    /// entries newer than `since` (a last-seen bus timestamp).
    pub fn subscribe_queue_since(
        &self,
        filters: Vec<BusFilter>,
        capacity: usize,
        since: Option<u64>,
    ) -> QueueSubscription {
        let uid = nanoid!();
        let queue = PollQueue::new(capacity.max(1));

        let mut inner = self.inner.lock();
        if let Some(since) = since {
            for message in inner.history.since(since) {
                if BusFilter::any_match(&filters, message) {
                    queue.push(message.clone());
                }
            }
        }
        inner.subscriptions.insert(
            uid.clone(),
            Subscription {
                filters,
                sink: Sink::Queue(Arc::clone(&queue)),
            },
        );

        QueueSubscription { uid, queue }
    }

    /// Remove a subscription. A pending long-poll waiter is woken and will
    /// observe its queue closed, returning an empty drain.
    pub fn unsubscribe(&self, uid: &str) {
        let removed = self.inner.lock().subscriptions.remove(uid);
        if let Some(Subscription {
            sink: Sink::Queue(queue),
            ..
        }) = removed
        {
            queue.close();
        }
    }

    /// Long-poll for messages matching any of `filters`.
    ///
    /// Creates an ephemeral queue subscription (seeded from history when
    /// `since` is given), awaits queue-non-empty, timeout expiry, or
    /// shutdown, then drains, unsubscribes, and returns. Zero matches yield
    /// an empty vec once the timeout elapses.
    pub async fn wait_for(
        &self,
        filters: Vec<BusFilter>,
        timeout: Duration,
        since: Option<u64>,
    ) -> Vec<BusMessage> {
        let sub = self.subscribe_queue_since(filters, self.queue_capacity, since);

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        loop {
            let drained = sub.drain();
            if !drained.is_empty() {
                self.unsubscribe(&sub.uid);
                return drained;
            }
            if sub.is_closed() || self.shutdown.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = sub.queue.notified() => {}
                _ = &mut deadline => break,
                _ = self.shutdown.cancelled() => break,
            }
        }

        let drained = sub.drain();
        self.unsubscribe(&sub.uid);
        drained
    }

    /// Messages in the history ring newer than `epoch_ms`, oldest first.
    pub fn history_since(&self, epoch_ms: u64) -> Vec<BusMessage> {
        self.inner.lock().history.since(epoch_ms).cloned().collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.lock().subscriptions.len()
    }

    pub fn history_len(&self) -> usize {
        self.inner.lock().history.len()
    }

    /// Drop queue subscriptions idle past `max_idle`; returns how many.
    ///
    /// Push subscriptions never expire.
    pub fn expire_idle(&self, max_idle: Duration) -> usize {
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        let expired: Vec<String> = inner
            .subscriptions
            .iter()
            .filter_map(|(uid, sub)| match &sub.sink {
                Sink::Queue(queue) if queue.idle_for(now) > max_idle => Some(uid.clone()),
                _ => None,
            })
            .collect();

        for uid in &expired {
            if let Some(Subscription {
                sink: Sink::Queue(queue),
                ..
            }) = inner.subscriptions.remove(uid)
            {
                queue.close();
            }
        }
        expired.len()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
