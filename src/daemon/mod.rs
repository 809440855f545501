//! Daemon wiring: builds the engine, dispatch worker, and REST surface,
//! then runs the monitor loop until a signal or a fatal tailer error.

pub mod signals;

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::engine::cooldown::CooldownGate;
use crate::monitor::MonitorLoop;
use crate::notify::dispatch::{self, NotificationDispatcher};
use crate::notify::providers::build_channels;
use crate::store::AlertStore;

/// Run the daemon in the foreground until shutdown.
pub fn run(config: Config) -> Result<()> {
    let store = Arc::new(AlertStore::default());
    let channels = Arc::new(build_channels(&config.channels)?);
    info!(channels = channels.len(), "notification channels configured");

    let gate = CooldownGate::new(config.monitor.alert_cooldown_minutes);
    let dispatcher = NotificationDispatcher::new(channels.clone(), gate, store.clone());
    let (handle, worker) = dispatch::spawn(dispatcher, config.monitor.dispatch_queue_capacity)?;

    #[cfg(feature = "api")]
    if config.api.enabled {
        let state = crate::api::ApiState::new(&config, store.clone(), channels.clone());
        crate::api::spawn(config.api.bind.clone(), state)?;
    }

    let shutdown = signals::install()?;
    let mut monitor = MonitorLoop::new(config.monitor.clone(), handle, shutdown)?;
    let result = monitor.run();

    // Dropping the monitor drops the last queue sender; the worker drains
    // whatever is still queued (the crash alert included) and exits.
    drop(monitor);
    if worker.join().is_err() {
        warn!("dispatch worker panicked during shutdown");
    }
    result
}
