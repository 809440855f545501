//! In-memory alert history shared between the monitor and the REST surface.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::alert::{Alert, Severity};

/// Lifecycle state of a stored alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Not yet acknowledged by an operator.
    Open,
    /// Resolved by an operator.
    Closed,
}

/// An alert plus its operator-facing lifecycle fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAlert {
    /// The alert payload as dispatched.
    #[serde(flatten)]
    pub alert: Alert,
    /// Open/closed state.
    pub status: AlertStatus,
    /// When the alert was resolved, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Free-form note captured at resolution time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
}

/// Aggregate counts over the stored alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStats {
    /// All alerts ever stored this run.
    pub total_alerts: usize,
    /// Alerts still open.
    pub open_alerts: usize,
    /// Open alerts at error or critical severity.
    pub error_count: usize,
    /// Open alerts at warning severity.
    pub warning_count: usize,
}

/// Append-only in-memory alert history.
///
/// History lives for the process lifetime only; there is deliberately no
/// persistence behind it.
#[derive(Debug, Default)]
pub struct AlertStore {
    inner: RwLock<Vec<StoredAlert>>,
}

impl AlertStore {
    /// Record a freshly dispatched alert as open.
    pub fn record(&self, alert: Alert) {
        self.inner.write().push(StoredAlert {
            alert,
            status: AlertStatus::Open,
            resolved_at: None,
            resolution_note: None,
        });
    }

    /// Snapshot of all stored alerts, newest last.
    #[must_use]
    pub fn list(&self) -> Vec<StoredAlert> {
        self.inner.read().clone()
    }

    /// Aggregate counts.
    #[must_use]
    pub fn stats(&self) -> AlertStats {
        let alerts = self.inner.read();
        let open = alerts
            .iter()
            .filter(|stored| stored.status == AlertStatus::Open);
        let (mut open_alerts, mut error_count, mut warning_count) = (0, 0, 0);
        for stored in open {
            open_alerts += 1;
            match stored.alert.severity {
                Severity::Error | Severity::Critical => error_count += 1,
                Severity::Warning => warning_count += 1,
                Severity::Info => {}
            }
        }
        AlertStats {
            total_alerts: alerts.len(),
            open_alerts,
            error_count,
            warning_count,
        }
    }

    /// Close an open alert. Returns the updated record, or `None` when the
    /// id is unknown. Resolving an already-closed alert is a no-op that
    /// still returns the record.
    pub fn resolve(&self, id: Uuid, note: Option<String>) -> Option<StoredAlert> {
        let mut alerts = self.inner.write();
        let stored = alerts.iter_mut().find(|stored| stored.alert.id == id)?;
        if stored.status == AlertStatus::Open {
            stored.status = AlertStatus::Closed;
            stored.resolved_at = Some(Utc::now());
            stored.resolution_note = note;
        }
        Some(stored.clone())
    }

    /// Remove an alert outright. Returns whether anything was removed.
    pub fn delete(&self, id: Uuid) -> bool {
        let mut alerts = self.inner.write();
        let before = alerts.len();
        alerts.retain(|stored| stored.alert.id != id);
        alerts.len() != before
    }
}
