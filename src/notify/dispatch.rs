//! Cooldown-gated alert fan-out, decoupled from ingestion by a bounded
//! queue.
//!
//! The dispatcher worker owns the cooldown gate and the channel set; the
//! monitor thread only ever touches the queue. A hanging transport therefore
//! stalls at most the worker, never log ingestion, and a full queue sheds
//! the newest alert rather than blocking.

use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::Utc;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tracing::{debug, error, info, warn};

use crate::core::alert::Alert;
use crate::core::errors::{Result, WardenError};
use crate::engine::cooldown::{AlertKey, CooldownGate};
use crate::notify::channel::NotificationChannel;
use crate::store::AlertStore;

/// Fans one alert out to every enabled channel, behind the cooldown gate.
pub struct NotificationDispatcher {
    channels: Arc<Vec<Box<dyn NotificationChannel>>>,
    gate: CooldownGate,
    store: Arc<AlertStore>,
}

impl NotificationDispatcher {
    /// Build a dispatcher over a fixed channel set.
    #[must_use]
    pub fn new(
        channels: Arc<Vec<Box<dyn NotificationChannel>>>,
        gate: CooldownGate,
        store: Arc<AlertStore>,
    ) -> Self {
        Self {
            channels,
            gate,
            store,
        }
    }

    /// Attempt to send one alert. Returns whether a send was attempted
    /// (false means the cooldown gate suppressed it).
    ///
    /// Every enabled channel is tried exactly once; a failing channel is
    /// logged and never blocks or suppresses its siblings. The gate is
    /// marked after the fan-out regardless of per-channel outcomes, and the
    /// alert is recorded in the store alongside the attempt.
    pub fn dispatch(&mut self, alert: &Alert) -> bool {
        let key = AlertKey::of(alert);
        let now = Utc::now();
        if !self.gate.should_send(&key, now) {
            debug!(key = %key, "alert suppressed by cooldown");
            return false;
        }

        info!(title = %alert.title, severity = %alert.severity, "sending alert");
        for channel in self.channels.iter().filter(|channel| channel.is_enabled()) {
            match channel.deliver(alert) {
                Ok(outcome) if outcome.success => {
                    info!(channel = channel.id(), "notification delivered");
                }
                Ok(outcome) => {
                    error!(channel = channel.id(), detail = %outcome.detail, "notification rejected");
                }
                Err(err) => {
                    error!(channel = channel.id(), error = %err, "notification transport failed");
                }
            }
        }
        self.gate.mark_sent(key, now);
        self.store.record(alert.clone());
        true
    }
}

/// Producer-side handle to the dispatch queue. Cloneable; dropping every
/// clone shuts the worker down once the queue drains.
#[derive(Clone)]
pub struct DispatchHandle {
    tx: Sender<Alert>,
}

impl DispatchHandle {
    fn new(tx: Sender<Alert>) -> Self {
        Self { tx }
    }

    /// Enqueue an alert for dispatch. Returns `false` when the alert was
    /// shed (queue full) or the worker is gone; ingestion never blocks here.
    pub fn publish(&self, alert: Alert) -> bool {
        match self.tx.try_send(alert) {
            Ok(()) => true,
            Err(TrySendError::Full(alert)) => {
                warn!(title = %alert.title, "dispatch queue full, shedding alert");
                false
            }
            Err(TrySendError::Disconnected(alert)) => {
                error!(title = %alert.title, "dispatch worker gone, dropping alert");
                false
            }
        }
    }
}

/// Spawn the dispatcher worker over a bounded queue of `capacity` alerts.
pub fn spawn(
    mut dispatcher: NotificationDispatcher,
    capacity: usize,
) -> Result<(DispatchHandle, JoinHandle<()>)> {
    let (tx, rx): (Sender<Alert>, Receiver<Alert>) = bounded(capacity);
    let worker = std::thread::Builder::new()
        .name("mlw-dispatch".to_string())
        .spawn(move || {
            for alert in rx {
                dispatcher.dispatch(&alert);
            }
            debug!("dispatch queue closed, worker exiting");
        })
        .map_err(|source| WardenError::Runtime {
            details: format!("failed to spawn dispatch worker: {source}"),
        })?;
    Ok((DispatchHandle::new(tx), worker))
}
