//! Concrete notification transports: SMTP email, Discord, Slack, generic
//! webhook.

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::json;

use crate::core::alert::{Alert, Severity};
use crate::core::config::{ChannelsConfig, EmailChannelConfig, WebhookChannelConfig};
use crate::core::errors::Result;
use crate::notify::channel::{DeliveryOutcome, NotificationChannel};

/// Timeout applied to every outbound HTTP delivery.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Build every channel that is enabled and fully configured.
///
/// Disabled or incomplete sections are skipped silently; an enabled section
/// with a bad value (unusable address, malformed URL) surfaces at first
/// delivery, not here.
pub fn build_channels(config: &ChannelsConfig) -> Result<Vec<Box<dyn NotificationChannel>>> {
    let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();
    if config.email.enabled && !config.email.smtp_server.is_empty() {
        channels.push(Box::new(EmailChannel::new(config.email.clone())));
    }
    if config.discord.enabled && !config.discord.url.is_empty() {
        channels.push(Box::new(DiscordChannel::new(config.discord.clone())?));
    }
    if config.slack.enabled && !config.slack.url.is_empty() {
        channels.push(Box::new(SlackChannel::new(config.slack.clone())?));
    }
    if config.webhook.enabled && !config.webhook.url.is_empty() {
        channels.push(Box::new(WebhookChannel::new(config.webhook.clone())?));
    }
    Ok(channels)
}

fn http_client() -> Result<Client> {
    Ok(Client::builder().timeout(HTTP_TIMEOUT).build()?)
}

fn post_json(
    client: &Client,
    url: &str,
    payload: &serde_json::Value,
) -> Result<DeliveryOutcome> {
    let response = client.post(url).json(payload).send()?;
    if response.status().is_success() {
        Ok(DeliveryOutcome::delivered())
    } else {
        Ok(DeliveryOutcome::failed(format!(
            "endpoint returned {}",
            response.status()
        )))
    }
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

/// SMTP email channel (STARTTLS relay).
pub struct EmailChannel {
    config: EmailChannelConfig,
}

impl EmailChannel {
    /// Build from a config section.
    #[must_use]
    pub fn new(config: EmailChannelConfig) -> Self {
        Self { config }
    }

    /// Plain-text body: message first, then a details block.
    #[must_use]
    pub fn body(alert: &Alert) -> String {
        let mut body = format!("{}\n\n", alert.message);
        if !alert.details.is_empty() {
            body.push_str("Details:\n");
            for (key, value) in &alert.details {
                let _ = writeln!(body, "  {key}: {value}");
            }
        }
        body
    }
}

impl NotificationChannel for EmailChannel {
    fn id(&self) -> &str {
        "email"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn deliver(&self, alert: &Alert) -> Result<DeliveryOutcome> {
        use lettre::message::header::ContentType;
        use lettre::transport::smtp::authentication::Credentials;
        use lettre::{Message, SmtpTransport, Transport};

        let subject = format!(
            "[Media Alert - {}] {}",
            alert.severity.to_string().to_uppercase(),
            alert.title
        );
        let email = Message::builder()
            .from(self.config.from.parse()?)
            .to(self.config.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(Self::body(alert))?;

        let credentials = Credentials::new(
            self.config.smtp_user.clone(),
            self.config.smtp_password.clone(),
        );
        let mut builder = SmtpTransport::starttls_relay(&self.config.smtp_server)?;
        if let Some(port) = self.config.smtp_port {
            builder = builder.port(port);
        }
        let mailer = builder.credentials(credentials).build();

        match mailer.send(&email) {
            Ok(_) => Ok(DeliveryOutcome::delivered()),
            Err(err) => Ok(DeliveryOutcome::failed(format!("smtp send failed: {err}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Discord
// ---------------------------------------------------------------------------

/// Discord webhook channel.
pub struct DiscordChannel {
    config: WebhookChannelConfig,
    client: Client,
}

impl DiscordChannel {
    /// Build from a config section.
    pub fn new(config: WebhookChannelConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: http_client()?,
        })
    }

    /// Embed color per severity.
    #[must_use]
    pub const fn color(severity: Severity) -> u32 {
        match severity {
            Severity::Critical => 0xFF0000,
            Severity::Error => 0xFF6B6B,
            Severity::Warning => 0xFFA500,
            Severity::Info => 0x3498DB,
        }
    }

    /// Embed payload for one alert.
    #[must_use]
    pub fn payload(alert: &Alert) -> serde_json::Value {
        let fields: Vec<serde_json::Value> = alert
            .details
            .iter()
            .map(|(key, value)| json!({"name": key, "value": value, "inline": true}))
            .collect();
        json!({
            "embeds": [{
                "title": alert.title,
                "description": alert.message,
                "color": Self::color(alert.severity),
                "timestamp": alert.timestamp.to_rfc3339(),
                "footer": {"text": "media-log-warden"},
                "fields": fields,
            }]
        })
    }
}

impl NotificationChannel for DiscordChannel {
    fn id(&self) -> &str {
        "discord"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn deliver(&self, alert: &Alert) -> Result<DeliveryOutcome> {
        post_json(&self.client, &self.config.url, &Self::payload(alert))
    }
}

// ---------------------------------------------------------------------------
// Slack
// ---------------------------------------------------------------------------

/// Slack webhook channel.
pub struct SlackChannel {
    config: WebhookChannelConfig,
    client: Client,
}

impl SlackChannel {
    /// Build from a config section.
    pub fn new(config: WebhookChannelConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: http_client()?,
        })
    }

    /// Attachment color name per severity.
    #[must_use]
    pub const fn color(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical | Severity::Error => "danger",
            Severity::Warning => "warning",
            Severity::Info => "good",
        }
    }

    /// Attachment payload for one alert.
    #[must_use]
    pub fn payload(alert: &Alert) -> serde_json::Value {
        let fields: Vec<serde_json::Value> = alert
            .details
            .iter()
            .map(|(key, value)| json!({"title": key, "value": value, "short": true}))
            .collect();
        json!({
            "attachments": [{
                "fallback": format!("{}: {}", alert.title, alert.message),
                "color": Self::color(alert.severity),
                "title": alert.title,
                "text": alert.message,
                "ts": alert.timestamp.timestamp(),
                "fields": fields,
            }]
        })
    }
}

impl NotificationChannel for SlackChannel {
    fn id(&self) -> &str {
        "slack"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn deliver(&self, alert: &Alert) -> Result<DeliveryOutcome> {
        post_json(&self.client, &self.config.url, &Self::payload(alert))
    }
}

// ---------------------------------------------------------------------------
// Generic webhook
// ---------------------------------------------------------------------------

/// Generic JSON webhook channel: the raw alert shape, no platform framing.
pub struct WebhookChannel {
    config: WebhookChannelConfig,
    client: Client,
}

impl WebhookChannel {
    /// Build from a config section.
    pub fn new(config: WebhookChannelConfig) -> Result<Self> {
        Ok(Self {
            config,
            client: http_client()?,
        })
    }

    /// Raw payload for one alert.
    #[must_use]
    pub fn payload(alert: &Alert) -> serde_json::Value {
        json!({
            "title": alert.title,
            "message": alert.message,
            "severity": alert.severity,
            "timestamp": alert.timestamp.to_rfc3339(),
            "details": alert.details,
        })
    }
}

impl NotificationChannel for WebhookChannel {
    fn id(&self) -> &str {
        "webhook"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn deliver(&self, alert: &Alert) -> Result<DeliveryOutcome> {
        post_json(&self.client, &self.config.url, &Self::payload(alert))
    }
}
