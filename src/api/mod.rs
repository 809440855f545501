//! REST surface: thin CRUD over the alert store, config view, channel
//! settings, and host health.
//!
//! The server runs on its own thread with a current-thread tokio runtime so
//! the rest of the daemon stays synchronous. Everything served here is a
//! view over shared state; nothing feeds back into the running monitor.

pub mod routes;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::core::config::Config;
use crate::core::errors::{Result, WardenError};
use crate::metrics::HostMetrics;
use crate::notify::channel::NotificationChannel;
use crate::store::AlertStore;

/// Monitoring knobs exposed over `GET /api/config`.
///
/// A `PUT` mutates only this view; the running monitor keeps the
/// configuration it started with, and a restart picks changes up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    /// Error-rule evaluation flag.
    pub monitor_errors: bool,
    /// Warning-rule evaluation flag.
    pub monitor_warnings: bool,
    /// Burst threshold count.
    pub error_threshold: usize,
    /// Sliding-window length in minutes.
    pub time_window_minutes: u64,
    /// Cooldown quiet period in minutes.
    pub alert_cooldown_minutes: u64,
    /// Watched log path.
    pub log_path: String,
}

impl ConfigView {
    fn from_config(config: &Config) -> Self {
        Self {
            monitor_errors: config.monitor.monitor_errors,
            monitor_warnings: config.monitor.monitor_warnings,
            error_threshold: config.monitor.error_threshold,
            time_window_minutes: config.monitor.time_window_minutes,
            alert_cooldown_minutes: config.monitor.alert_cooldown_minutes,
            log_path: config.monitor.log_path.display().to_string(),
        }
    }

    fn apply(&mut self, update: ConfigViewUpdate) {
        if let Some(value) = update.monitor_errors {
            self.monitor_errors = value;
        }
        if let Some(value) = update.monitor_warnings {
            self.monitor_warnings = value;
        }
        if let Some(value) = update.error_threshold {
            self.error_threshold = value;
        }
        if let Some(value) = update.time_window_minutes {
            self.time_window_minutes = value;
        }
        if let Some(value) = update.alert_cooldown_minutes {
            self.alert_cooldown_minutes = value;
        }
        if let Some(value) = update.log_path {
            self.log_path = value;
        }
    }
}

/// Partial update body for `PUT /api/config`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigViewUpdate {
    /// New error-rule flag, if given.
    pub monitor_errors: Option<bool>,
    /// New warning-rule flag, if given.
    pub monitor_warnings: Option<bool>,
    /// New burst threshold, if given.
    pub error_threshold: Option<usize>,
    /// New window length, if given.
    pub time_window_minutes: Option<u64>,
    /// New cooldown, if given.
    pub alert_cooldown_minutes: Option<u64>,
    /// New log path, if given.
    pub log_path: Option<String>,
}

/// One notification channel as presented to operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSetting {
    /// Stable channel id (`email`, `discord`, ...).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Transport kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the channel was enabled at startup.
    pub enabled: bool,
    /// Non-secret endpoint summary.
    pub config: serde_json::Value,
}

/// Partial update body for `PUT /api/notifications/channels/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSettingUpdate {
    /// New enabled flag, if given.
    pub enabled: Option<bool>,
    /// New endpoint summary, if given.
    pub config: Option<serde_json::Value>,
}

fn channel_settings(config: &Config) -> Vec<ChannelSetting> {
    let channels = &config.channels;
    vec![
        ChannelSetting {
            id: "email".to_string(),
            name: "Email Notifications".to_string(),
            kind: "email".to_string(),
            enabled: channels.email.enabled,
            config: json!({
                "smtp_server": channels.email.smtp_server,
                "smtp_user": channels.email.smtp_user,
            }),
        },
        ChannelSetting {
            id: "discord".to_string(),
            name: "Discord Webhook".to_string(),
            kind: "discord".to_string(),
            enabled: channels.discord.enabled,
            config: json!({"webhook_url": channels.discord.url}),
        },
        ChannelSetting {
            id: "slack".to_string(),
            name: "Slack Webhook".to_string(),
            kind: "slack".to_string(),
            enabled: channels.slack.enabled,
            config: json!({"webhook_url": channels.slack.url}),
        },
        ChannelSetting {
            id: "webhook".to_string(),
            name: "Custom Webhook".to_string(),
            kind: "webhook".to_string(),
            enabled: channels.webhook.enabled,
            config: json!({"webhook_url": channels.webhook.url}),
        },
    ]
}

/// Shared state behind every handler.
#[derive(Clone)]
pub struct ApiState {
    /// Alert history.
    pub store: Arc<AlertStore>,
    /// Live transports, used by the channel-test endpoint.
    pub channels: Arc<Vec<Box<dyn NotificationChannel>>>,
    /// Mutable config view.
    pub config_view: Arc<RwLock<ConfigView>>,
    /// Mutable channel settings view.
    pub channel_settings: Arc<RwLock<Vec<ChannelSetting>>>,
    /// Host metrics collector.
    pub metrics: Arc<Mutex<HostMetrics>>,
    /// Process start time, for uptime reporting.
    pub started_at: DateTime<Utc>,
}

impl ApiState {
    /// Build API state from the startup configuration and shared stores.
    #[must_use]
    pub fn new(
        config: &Config,
        store: Arc<AlertStore>,
        channels: Arc<Vec<Box<dyn NotificationChannel>>>,
    ) -> Self {
        Self {
            store,
            channels,
            config_view: Arc::new(RwLock::new(ConfigView::from_config(config))),
            channel_settings: Arc::new(RwLock::new(channel_settings(config))),
            metrics: Arc::new(Mutex::new(HostMetrics::new())),
            started_at: Utc::now(),
        }
    }
}

/// Serve the REST surface on a dedicated thread. The thread lives for the
/// rest of the process; the returned handle is informational.
pub fn spawn(bind: String, state: ApiState) -> Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("mlw-api".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(source) => {
                    error!(error = %source, "failed to build api runtime");
                    return;
                }
            };
            if let Err(err) = runtime.block_on(serve(&bind, state)) {
                error!(error = %err, "api server exited");
            }
        })
        .map_err(|source| WardenError::Runtime {
            details: format!("failed to spawn api thread: {source}"),
        })
}

async fn serve(bind: &str, state: ApiState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|source| WardenError::Runtime {
            details: format!("api bind {bind}: {source}"),
        })?;
    info!(bind, "serving REST api");
    axum::serve(listener, routes::router(state))
        .await
        .map_err(|source| WardenError::Runtime {
            details: format!("api server: {source}"),
        })
}
