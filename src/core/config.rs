//! Configuration: TOML file with serde defaults plus environment overrides.
//!
//! Every knob the daemon honors at runtime lives here. The file is read once
//! at startup; the running monitor treats the result as immutable.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, WardenError};

/// Full daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Log monitoring engine settings.
    pub monitor: MonitorConfig,
    /// Notification channel settings.
    pub channels: ChannelsConfig,
    /// REST surface settings.
    pub api: ApiConfig,
    /// Media-server status client settings.
    pub media_server: MediaServerConfig,
}

/// Settings consumed by the monitor loop and engine stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Evaluate error rules at all.
    pub monitor_errors: bool,
    /// Evaluate warning rules at all.
    pub monitor_warnings: bool,
    /// Error occurrences within the window required to raise a burst alert.
    pub error_threshold: usize,
    /// Sliding-window length for burst detection, in minutes.
    pub time_window_minutes: u64,
    /// Quiet period between two alerts sharing a cooldown key, in minutes.
    pub alert_cooldown_minutes: u64,
    /// Directory holding the media server's logs (or a single log file).
    pub log_path: PathBuf,
    /// File name tailed first when `log_path` is a directory.
    pub primary_log: String,
    /// Tailer sleep between polls when no data is available, in milliseconds.
    pub poll_interval_ms: u64,
    /// Capacity of the recently-seen-line hash set.
    pub dedup_capacity: usize,
    /// Maximum characters of the triggering line carried in alert details.
    pub excerpt_max_chars: usize,
    /// Capacity of the bounded alert dispatch queue.
    pub dispatch_queue_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            monitor_errors: true,
            monitor_warnings: true,
            error_threshold: 5,
            time_window_minutes: 5,
            alert_cooldown_minutes: 15,
            log_path: PathBuf::from("/var/log/mediaserver"),
            primary_log: "Media Server.log".to_string(),
            poll_interval_ms: 500,
            dedup_capacity: 10_000,
            excerpt_max_chars: 200,
            dispatch_queue_capacity: 64,
        }
    }
}

/// All notification channel sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelsConfig {
    /// SMTP email channel.
    pub email: EmailChannelConfig,
    /// Discord webhook channel.
    pub discord: WebhookChannelConfig,
    /// Slack webhook channel.
    pub slack: WebhookChannelConfig,
    /// Generic JSON webhook channel.
    pub webhook: WebhookChannelConfig,
}

/// SMTP email channel settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailChannelConfig {
    /// Whether the channel participates in dispatch.
    pub enabled: bool,
    /// SMTP relay host.
    pub smtp_server: String,
    /// SMTP relay port (relay default when omitted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_port: Option<u16>,
    /// SMTP username.
    pub smtp_user: String,
    /// SMTP password.
    pub smtp_password: String,
    /// From address.
    pub from: String,
    /// To address.
    pub to: String,
}

/// Webhook-style channel settings (Discord, Slack, generic).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookChannelConfig {
    /// Whether the channel participates in dispatch.
    pub enabled: bool,
    /// Webhook endpoint URL.
    pub url: String,
}

/// REST surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Whether to serve the REST surface at all.
    pub enabled: bool,
    /// Socket address to bind, e.g. `0.0.0.0:5000`.
    pub bind: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Media-server status client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaServerConfig {
    /// Whether status enrichment is attempted at all.
    pub enabled: bool,
    /// Base URL of the media server's HTTP API.
    pub base_url: String,
    /// API token sent with every request.
    pub token: String,
}

impl Default for MediaServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:32400".to_string(),
            token: String::new(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, overlaid by the TOML file at `path`
    /// (when given), overlaid by environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WardenError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| WardenError::io(path, source))?;
        Ok(toml::from_str(&raw)?)
    }

    /// Render the resolved configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| WardenError::Serialization {
            context: "toml",
            details: err.to_string(),
        })
    }

    /// Overlay process environment variables onto the current values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Overlay variables from `lookup` onto the current values.
    ///
    /// Absent variables leave the existing value untouched; present-but-invalid
    /// values are a startup error rather than a silent fallback.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let vars = Overrides { lookup };

        let monitor = &mut self.monitor;
        vars.set_bool("MONITOR_ERRORS", &mut monitor.monitor_errors)?;
        vars.set_bool("MONITOR_WARNINGS", &mut monitor.monitor_warnings)?;
        vars.set_parsed("ERROR_THRESHOLD", &mut monitor.error_threshold)?;
        vars.set_parsed("TIME_WINDOW_MINUTES", &mut monitor.time_window_minutes)?;
        vars.set_parsed("ALERT_COOLDOWN_MINUTES", &mut monitor.alert_cooldown_minutes)?;
        if let Some(value) = vars.get("MEDIA_LOG_PATH") {
            monitor.log_path = PathBuf::from(value);
        }

        let email = &mut self.channels.email;
        vars.set_bool("EMAIL_ENABLED", &mut email.enabled)?;
        vars.set_string("SMTP_SERVER", &mut email.smtp_server);
        if let Some(value) = vars.get("SMTP_PORT") {
            email.smtp_port = Some(parse_value("SMTP_PORT", &value)?);
        }
        vars.set_string("SMTP_USER", &mut email.smtp_user);
        vars.set_string("SMTP_PASSWORD", &mut email.smtp_password);
        vars.set_string("EMAIL_FROM", &mut email.from);
        vars.set_string("EMAIL_TO", &mut email.to);

        vars.set_bool("DISCORD_ENABLED", &mut self.channels.discord.enabled)?;
        vars.set_string("DISCORD_WEBHOOK_URL", &mut self.channels.discord.url);
        vars.set_bool("SLACK_ENABLED", &mut self.channels.slack.enabled)?;
        vars.set_string("SLACK_WEBHOOK_URL", &mut self.channels.slack.url);
        vars.set_bool("WEBHOOK_ENABLED", &mut self.channels.webhook.enabled)?;
        vars.set_string("CUSTOM_WEBHOOK_URL", &mut self.channels.webhook.url);

        vars.set_bool("API_ENABLED", &mut self.api.enabled)?;
        vars.set_string("API_BIND", &mut self.api.bind);

        vars.set_bool("MEDIA_API_ENABLED", &mut self.media_server.enabled)?;
        vars.set_string("MEDIA_SERVER_URL", &mut self.media_server.base_url);
        vars.set_string("MEDIA_SERVER_TOKEN", &mut self.media_server.token);
        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let monitor = &self.monitor;
        if monitor.error_threshold == 0 {
            return Err(invalid("monitor.error_threshold must be at least 1"));
        }
        if monitor.time_window_minutes == 0 {
            return Err(invalid("monitor.time_window_minutes must be at least 1"));
        }
        if monitor.poll_interval_ms == 0 {
            return Err(invalid("monitor.poll_interval_ms must be at least 1"));
        }
        if monitor.dedup_capacity == 0 {
            return Err(invalid("monitor.dedup_capacity must be at least 1"));
        }
        if monitor.dispatch_queue_capacity == 0 {
            return Err(invalid("monitor.dispatch_queue_capacity must be at least 1"));
        }
        if self.channels.email.enabled && self.channels.email.smtp_server.is_empty() {
            return Err(invalid("channels.email enabled without smtp_server"));
        }
        Ok(())
    }
}

struct Overrides<F: Fn(&str) -> Option<String>> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Overrides<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.is_empty())
    }

    fn set_string(&self, key: &str, slot: &mut String) {
        if let Some(value) = self.get(key) {
            *slot = value;
        }
    }

    fn set_bool(&self, key: &str, slot: &mut bool) -> Result<()> {
        if let Some(value) = self.get(key) {
            *slot = match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(invalid(format!("{key} must be a boolean, got {other:?}")));
                }
            };
        }
        Ok(())
    }

    fn set_parsed<T: std::str::FromStr>(&self, key: &str, slot: &mut T) -> Result<()> {
        if let Some(value) = self.get(key) {
            *slot = parse_value(key, &value)?;
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| invalid(format!("{key} must be numeric, got {value:?}")))
}

fn invalid(details: impl Into<String>) -> WardenError {
    WardenError::InvalidConfig {
        details: details.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::collections::HashMap;

    #[test]
    fn defaults_mirror_shipped_thresholds() {
        let config = Config::default();
        assert!(config.monitor.monitor_errors);
        assert!(config.monitor.monitor_warnings);
        assert_eq!(config.monitor.error_threshold, 5);
        assert_eq!(config.monitor.time_window_minutes, 5);
        assert_eq!(config.monitor.alert_cooldown_minutes, 15);
        assert!(!config.channels.email.enabled);
    }

    #[test]
    fn toml_round_trip_preserves_channel_sections() {
        let mut config = Config::default();
        config.channels.slack.enabled = true;
        config.channels.slack.url = "https://hooks.slack.example/T000".to_string();
        let rendered = config.to_toml().expect("render toml");
        let parsed: Config = toml::from_str(&rendered).expect("parse rendered toml");
        assert!(parsed.channels.slack.enabled);
        assert_eq!(parsed.channels.slack.url, config.channels.slack.url);
    }

    #[test]
    fn overrides_take_precedence_over_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ERROR_THRESHOLD", "9"),
            ("SLACK_ENABLED", "true"),
            ("SLACK_WEBHOOK_URL", "https://hooks.slack.example/T999"),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(ToString::to_string))
            .expect("overrides apply");
        assert_eq!(config.monitor.error_threshold, 9);
        assert!(config.channels.slack.enabled);
        assert_eq!(config.channels.slack.url, "https://hooks.slack.example/T999");
    }

    #[test]
    fn bad_numeric_override_fails_startup() {
        let err = Config::default()
            .apply_overrides(|key| {
                (key == "ERROR_THRESHOLD").then(|| "not-a-number".to_string())
            })
            .expect_err("bad numeric must fail");
        assert_eq!(err.code(), "MLW-1001");
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut config = Config::default();
        config.monitor.error_threshold = 0;
        let err = config.validate().expect_err("zero threshold must fail");
        assert_eq!(err.code(), "MLW-1001");
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [monitor]
            error_threshold = 3

            [channels.discord]
            enabled = true
            url = "https://discord.example/api/webhooks/1/x"
            "#,
        )
        .expect("parse partial toml");
        assert_eq!(parsed.monitor.error_threshold, 3);
        assert_eq!(parsed.monitor.time_window_minutes, 5);
        assert!(parsed.channels.discord.enabled);
        assert!(!parsed.channels.slack.enabled);
    }
}
