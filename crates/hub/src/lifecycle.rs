// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub lifecycle management: configuration, startup, shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use wh_bus::{BusOptions, MessageBus};
use wh_core::{Clock, SystemClock};
use wh_registry::{ComponentGroupRegistry, ComponentRegistry, RegistryError};
use wh_storage::{StorageError, ValueStorage};

use crate::diagnostics::DiagnosticsService;
use crate::env;
use crate::global_variables::GlobalVariablesService;
use crate::notifications::NotificationsService;
use crate::system_status::SystemStatusService;

/// Bus counter uid for published messages.
const COUNTER_MESSAGES_PUBLISHED: &str = "message_bus.messages_published";

/// Hub configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root data directory (e.g. ~/.local/state/wirehome)
    pub data_dir: PathBuf,
    /// Port of the HTTP facade
    pub http_port: u16,
    /// Bus history and long-poll queue capacities
    pub bus: BusOptions,
    /// Idle TTL for long-poll subscriptions
    pub subscription_ttl: Duration,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self {
            data_dir: env::data_dir()?,
            http_port: env::http_port(),
            bus: BusOptions {
                history_capacity: env::bus_history_capacity(),
                queue_capacity: env::poll_queue_capacity(),
            },
            subscription_ttl: env::subscription_ttl(),
        })
    }
}

/// Assembled hub: storage, bus, registries, and the ambient services.
pub struct HubState {
    pub config: Config,
    pub storage: Arc<ValueStorage>,
    pub bus: Arc<MessageBus<SystemClock>>,
    pub components: Arc<ComponentRegistry<SystemClock>>,
    pub groups: Arc<ComponentGroupRegistry<SystemClock>>,
    pub diagnostics: Arc<DiagnosticsService>,
    pub system_status: Arc<SystemStatusService>,
    pub global_variables: Arc<GlobalVariablesService<SystemClock>>,
    pub notifications: Arc<NotificationsService<SystemClock>>,
    /// Process-wide shutdown signal observed by every background loop
    pub shutdown: CancellationToken,
    pub start_time: Instant,
}

impl HubState {
    /// Spawn the background loops: the diagnostics ticker and the bus idle
    /// sweep. Both exit when the shutdown token fires.
    pub fn spawn_background(&self) {
        tokio::spawn(Arc::clone(&self.diagnostics).run(self.shutdown.clone()));
        tokio::spawn(bus_maintenance(
            Arc::clone(&self.bus),
            self.config.subscription_ttl,
            self.shutdown.clone(),
        ));
    }

    /// Signal shutdown. In-flight long-polls return their queued messages;
    /// background loops exit at their next poll point.
    pub fn stop(&self) {
        info!("shutting down hub");
        self.shutdown.cancel();
    }
}

/// Build the hub from a configuration: open storage, wire bus and
/// registries, reload persisted state, seed the system status gauges.
pub fn startup(config: Config) -> Result<HubState, LifecycleError> {
    let shutdown = CancellationToken::new();
    let storage = Arc::new(ValueStorage::new(&config.data_dir));

    let diagnostics = Arc::new(DiagnosticsService::new());
    let published = diagnostics.register_counter(COUNTER_MESSAGES_PUBLISHED);
    let bus = Arc::new(MessageBus::new(
        SystemClock,
        config.bus,
        published,
        shutdown.clone(),
    ));

    let components = Arc::new(ComponentRegistry::new(
        Arc::clone(&storage),
        Arc::clone(&bus),
    ));
    let groups = Arc::new(ComponentGroupRegistry::new(
        Arc::clone(&storage),
        Arc::clone(&bus),
    ));
    components.initialize_all()?;
    groups.initialize_all()?;

    let global_variables = Arc::new(GlobalVariablesService::new(
        Arc::clone(&storage),
        Arc::clone(&bus),
    ));
    global_variables.initialize()?;

    let notifications = Arc::new(NotificationsService::new(Arc::clone(&bus), SystemClock));

    let system_status = Arc::new(SystemStatusService::new());
    system_status.set("wirehome.version", env!("CARGO_PKG_VERSION"));
    system_status.set("startup_timestamp", SystemClock.epoch_ms());
    {
        let bus = Arc::clone(&bus);
        system_status.set_provider("message_bus.subscriptions", move || {
            json!(bus.subscription_count())
        });
    }
    {
        let counter = diagnostics.register_counter(COUNTER_MESSAGES_PUBLISHED);
        system_status.set_provider("message_bus.messages_published_per_second", move || {
            json!(counter.rate())
        });
    }
    {
        let components = Arc::clone(&components);
        let groups = Arc::clone(&groups);
        system_status.set_provider("component_registry.count", move || {
            json!(components.uids().len())
        });
        system_status.set_provider("component_group_registry.count", move || {
            json!(groups.uids().len())
        });
    }

    info!(
        data_dir = %config.data_dir.display(),
        components = components.uids().len(),
        component_groups = groups.uids().len(),
        "hub state initialized"
    );

    Ok(HubState {
        config,
        storage,
        bus,
        components,
        groups,
        diagnostics,
        system_status,
        global_variables,
        notifications,
        shutdown,
        start_time: Instant::now(),
    })
}

/// Periodically drop long-poll subscriptions nobody drained within the TTL.
async fn bus_maintenance(
    bus: Arc<MessageBus<SystemClock>>,
    ttl: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let expired = bus.expire_idle(ttl);
                if expired > 0 {
                    debug!(expired, "expired idle bus subscriptions");
                }
            }
        }
    }
    debug!("bus maintenance stopped");
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to bind HTTP listener at {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
