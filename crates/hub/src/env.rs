// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the hub.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;
use wh_bus::{DEFAULT_HISTORY_CAPACITY, DEFAULT_QUEUE_CAPACITY};

/// Resolve data directory: WIREHOME_DATA_DIR > XDG_STATE_HOME/wirehome >
/// ~/.local/state/wirehome
pub fn data_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("WIREHOME_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("wirehome"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoDataDir)?;
    Ok(PathBuf::from(home).join(".local/state/wirehome"))
}

/// HTTP port for the API facade
pub fn http_port() -> u16 {
    std::env::var("WIREHOME_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080)
}

/// Capacity of the bus history ring
pub fn bus_history_capacity() -> usize {
    std::env::var("WIREHOME_BUS_HISTORY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HISTORY_CAPACITY)
}

/// Capacity of each long-poll subscription queue
pub fn poll_queue_capacity() -> usize {
    std::env::var("WIREHOME_POLL_QUEUE_CAPACITY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_QUEUE_CAPACITY)
}

/// Idle TTL for long-poll subscriptions (default 5 minutes)
pub fn subscription_ttl() -> Duration {
    std::env::var("WIREHOME_SUBSCRIPTION_TTL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(300))
}
