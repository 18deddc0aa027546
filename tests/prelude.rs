//! Shared fixture: a hub core over a temp data directory.

use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tokio_util::sync::CancellationToken;
use wh_bus::{BusOptions, MessageBus, QueueSubscription};
use wh_core::{BusFilter, FakeClock, OpsCounter};
use wh_registry::{ComponentGroupRegistry, ComponentRegistry};
use wh_storage::ValueStorage;

pub struct Hub {
    pub dir: TempDir,
    pub clock: FakeClock,
    pub storage: Arc<ValueStorage>,
    pub bus: Arc<MessageBus<FakeClock>>,
    pub components: Arc<ComponentRegistry<FakeClock>>,
    pub groups: Arc<ComponentGroupRegistry<FakeClock>>,
    pub shutdown: CancellationToken,
}

impl Hub {
    /// Boot a hub core over a fresh data directory.
    pub fn start() -> Self {
        Self::over(tempdir().expect("temp data directory"))
    }

    /// Simulate a process restart: rebuild everything over the same data
    /// directory and reload persisted state.
    pub fn restart(self) -> Self {
        let Hub { dir, .. } = self;
        Self::over(dir)
    }

    fn over(dir: TempDir) -> Self {
        let clock = FakeClock::new();
        let shutdown = CancellationToken::new();
        let storage = Arc::new(ValueStorage::new(dir.path()));
        let bus = Arc::new(MessageBus::new(
            clock.clone(),
            BusOptions::default(),
            Arc::new(OpsCounter::new("message_bus.messages_published")),
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
        components.initialize_all().expect("components reload");
        groups.initialize_all().expect("groups reload");

        Hub {
            dir,
            clock,
            storage,
            bus,
            components,
            groups,
            shutdown,
        }
    }

    /// Subscribe a capture queue for every bus message.
    pub fn events(&self) -> QueueSubscription {
        self.bus.subscribe_queue(vec![BusFilter::new()], 1000)
    }
}
