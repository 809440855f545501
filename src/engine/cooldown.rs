//! Cooldown gate: collapses same-kind alerts inside a quiet period.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::core::alert::{Alert, Severity};

/// Deduplication identity of an alert: severity plus title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    /// Severity component.
    pub severity: Severity,
    /// Title component.
    pub title: String,
}

impl AlertKey {
    /// Key for an alert payload.
    #[must_use]
    pub fn of(alert: &Alert) -> Self {
        Self {
            severity: alert.severity,
            title: alert.title.clone(),
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.severity, self.title)
    }
}

/// Tracks the last send time per alert key.
///
/// The record map is never pruned: the key space is bounded by the fixed
/// rule set, so distinct keys are finite.
#[derive(Debug)]
pub struct CooldownGate {
    cooldown: Duration,
    last_sent: HashMap<AlertKey, DateTime<Utc>>,
}

impl CooldownGate {
    /// Create a gate with the given quiet period in minutes.
    #[must_use]
    pub fn new(cooldown_minutes: u64) -> Self {
        Self {
            cooldown: Duration::minutes(i64::try_from(cooldown_minutes).unwrap_or(i64::MAX)),
            last_sent: HashMap::new(),
        }
    }

    /// Whether an alert with this key may be sent at `now`. The first
    /// occurrence of a key is always permitted.
    #[must_use]
    pub fn should_send(&self, key: &AlertKey, now: DateTime<Utc>) -> bool {
        self.last_sent
            .get(key)
            .is_none_or(|last| now.signed_duration_since(*last) >= self.cooldown)
    }

    /// Record that a send was attempted at `now`. Called after the attempt
    /// regardless of per-channel delivery outcome: the alert intent was
    /// still "sent".
    pub fn mark_sent(&mut self, key: AlertKey, now: DateTime<Utc>) {
        self.last_sent.insert(key, now);
    }
}

#[cfg(test)]
mod tests {
    use super::{AlertKey, CooldownGate};
    use crate::core::alert::Severity;
    use chrono::{Duration, Utc};

    fn key(title: &str) -> AlertKey {
        AlertKey {
            severity: Severity::Error,
            title: title.to_string(),
        }
    }

    #[test]
    fn first_occurrence_is_always_permitted() {
        let gate = CooldownGate::new(15);
        assert!(gate.should_send(&key("Multiple Database Error Detected"), Utc::now()));
    }

    #[test]
    fn repeat_inside_cooldown_is_suppressed_then_reopens() {
        let mut gate = CooldownGate::new(15);
        let key = key("Multiple Database Error Detected");
        let start = Utc::now();

        gate.mark_sent(key.clone(), start);
        assert!(!gate.should_send(&key, start + Duration::minutes(14)));
        assert!(gate.should_send(&key, start + Duration::minutes(15)));
    }

    #[test]
    fn keys_differing_in_severity_are_independent() {
        let mut gate = CooldownGate::new(15);
        let now = Utc::now();
        let error_key = key("Service Degraded");
        let warning_key = AlertKey {
            severity: Severity::Warning,
            title: "Service Degraded".to_string(),
        };

        gate.mark_sent(error_key.clone(), now);
        assert!(!gate.should_send(&error_key, now));
        assert!(gate.should_send(&warning_key, now));
    }

    #[test]
    fn display_joins_severity_and_title() {
        assert_eq!(
            key("Multiple Database Error Detected").to_string(),
            "error:Multiple Database Error Detected"
        );
    }
}
