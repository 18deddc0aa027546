// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wh-bus: process-internal message bus
//!
//! A subscriber-driven event router. Publishers hand over JSON-shaped
//! messages; the bus stamps them, remembers a bounded history, and fans
//! them out to filter subscriptions — synchronous push callbacks or bounded
//! long-poll queues awaiting a `wait_for` caller.

mod bus;
mod history;
mod subscription;

pub use bus::{BusOptions, MessageBus, DEFAULT_HISTORY_CAPACITY, DEFAULT_QUEUE_CAPACITY};
pub use subscription::QueueSubscription;
