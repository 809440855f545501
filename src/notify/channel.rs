//! The send contract between the dispatcher and concrete transports.

use crate::core::alert::Alert;
use crate::core::errors::Result;

/// Result of one delivery attempt.
///
/// Transport-level failures are values, not errors: a channel that reached
/// its endpoint and got a rejection reports `failed`, reserving `Err` for
/// faults below the protocol (connect, TLS, DNS).
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    /// Whether the endpoint accepted the alert.
    pub success: bool,
    /// Human-readable detail for the log line.
    pub detail: String,
}

impl DeliveryOutcome {
    /// Successful delivery.
    #[must_use]
    pub fn delivered() -> Self {
        Self {
            success: true,
            detail: "delivered".to_string(),
        }
    }

    /// Failed delivery with a reason.
    #[must_use]
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

/// A notification transport the dispatcher can fan out to.
///
/// Implementations must be safe to call at most once per alert and must not
/// panic past this boundary; the dispatcher treats both `Err` and a failed
/// outcome as a logged, non-fatal event.
pub trait NotificationChannel: Send + Sync {
    /// Stable channel identity, e.g. `discord`.
    fn id(&self) -> &str;

    /// Whether the channel participates in dispatch.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Attempt to deliver one alert.
    fn deliver(&self, alert: &Alert) -> Result<DeliveryOutcome>;
}
