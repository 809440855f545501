//! Alert payloads handed to the notification dispatcher and the alert store.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Alert severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational (startup, shutdown).
    Info,
    /// A matched warning pattern.
    Warning,
    /// A matched error pattern crossing its burst threshold.
    Error,
    /// Monitor-level failure.
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Immutable alert payload.
///
/// Built once by the monitor loop, then cloned into the alert store and onto
/// the dispatch queue. `details` is ordered so rendered payloads are stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identity, used by the REST surface.
    pub id: Uuid,
    /// Short human-readable title; part of the cooldown key.
    pub title: String,
    /// Longer description of what was observed.
    pub message: String,
    /// Severity of the alert.
    pub severity: Severity,
    /// Name of the matched classification rule, if any.
    pub pattern: Option<String>,
    /// When the alert was generated.
    pub timestamp: DateTime<Utc>,
    /// Extra key/value context rendered by each channel.
    pub details: BTreeMap<String, String>,
}

impl Alert {
    /// Create an alert with the given severity.
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            severity,
            pattern: None,
            timestamp: Utc::now(),
            details: BTreeMap::new(),
        }
    }

    /// Informational alert.
    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Info)
    }

    /// Warning alert.
    #[must_use]
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Warning)
    }

    /// Error alert.
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Error)
    }

    /// Critical alert.
    #[must_use]
    pub fn critical(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Critical)
    }

    /// Attach the matched pattern name.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Attach one detail entry.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Override the generation timestamp (used when the alert is derived
    /// from an already-timestamped log line).
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Alert, Severity};

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).expect("serialize severity");
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn builder_accumulates_details_in_order() {
        let alert = Alert::error("Burst", "5 errors in 5 minutes")
            .with_pattern("database_error")
            .with_detail("Pattern", "database_error")
            .with_detail("Count", "5");
        assert_eq!(alert.pattern.as_deref(), Some("database_error"));
        let keys: Vec<_> = alert.details.keys().cloned().collect();
        assert_eq!(keys, vec!["Count".to_string(), "Pattern".to_string()]);
    }
}
