//! Thin media-server API client used only to enrich status display.
//!
//! Every failure degrades to "unavailable" rather than an error: the
//! monitor must keep running whether or not the media server is reachable.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::config::MediaServerConfig;
use crate::core::errors::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Media-server identity and load summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    /// Server software version.
    pub version: String,
    /// Host platform string.
    pub platform: String,
    /// Currently playing sessions.
    pub sessions: usize,
    /// Configured library sections.
    pub libraries: usize,
}

/// One active playback session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Viewing user.
    pub user: String,
    /// Title being played.
    pub title: String,
    /// Player state, e.g. `playing` or `paused`.
    pub state: String,
    /// Whether the stream is being transcoded.
    pub transcoding: bool,
}

/// Blocking status client with token auth.
pub struct MediaServerClient {
    config: MediaServerConfig,
    client: reqwest::blocking::Client,
}

impl MediaServerClient {
    /// Build a client from its config section.
    pub fn new(config: MediaServerConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, client })
    }

    /// Whether status enrichment is configured at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.token.is_empty()
    }

    /// Server status, or `None` when disabled or unreachable.
    #[must_use]
    pub fn status(&self) -> Option<ServerStatus> {
        self.fetch("/status")
    }

    /// Active sessions, or an empty list when disabled or unreachable.
    #[must_use]
    pub fn active_sessions(&self) -> Vec<SessionInfo> {
        self.fetch("/sessions").unwrap_or_default()
    }

    fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> Option<T> {
        if !self.is_enabled() {
            return None;
        }
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let result = self
            .client
            .get(&url)
            .header("X-Api-Token", &self.config.token)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<T>);
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(url, error = %err, "media server unavailable");
                None
            }
        }
    }
}
