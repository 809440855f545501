//! MLW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, WardenError>;

/// Top-level error type for Media Log Warden.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("[MLW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[MLW-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[MLW-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[MLW-1101] pattern rule {name} failed to compile: {details}")]
    PatternCompile { name: String, details: String },

    #[error("[MLW-2001] no log files found under {path}")]
    NoLogFiles { path: PathBuf },

    #[error("[MLW-2002] tailer failure for {path}: {details}")]
    Tailer { path: PathBuf, details: String },

    #[error("[MLW-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[MLW-3001] notification channel {channel} failed: {details}")]
    Channel { channel: String, details: String },

    #[error("[MLW-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[MLW-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[MLW-3100] HTTP transport failure: {details}")]
    Http { details: String },

    #[error("[MLW-3200] SMTP failure: {details}")]
    Smtp { details: String },

    #[error("[MLW-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl WardenError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "MLW-1001",
            Self::MissingConfig { .. } => "MLW-1002",
            Self::ConfigParse { .. } => "MLW-1003",
            Self::PatternCompile { .. } => "MLW-1101",
            Self::NoLogFiles { .. } => "MLW-2001",
            Self::Tailer { .. } => "MLW-2002",
            Self::Serialization { .. } => "MLW-2101",
            Self::Channel { .. } => "MLW-3001",
            Self::Io { .. } => "MLW-3002",
            Self::ChannelClosed { .. } => "MLW-3003",
            Self::Http { .. } => "MLW-3100",
            Self::Smtp { .. } => "MLW-3200",
            Self::Runtime { .. } => "MLW-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::Channel { .. }
                | Self::Http { .. }
                | Self::Smtp { .. }
                | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for WardenError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<reqwest::Error> for WardenError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http {
            details: value.to_string(),
        }
    }
}

impl From<lettre::transport::smtp::Error> for WardenError {
    fn from(value: lettre::transport::smtp::Error) -> Self {
        Self::Smtp {
            details: value.to_string(),
        }
    }
}

impl From<lettre::error::Error> for WardenError {
    fn from(value: lettre::error::Error) -> Self {
        Self::Smtp {
            details: value.to_string(),
        }
    }
}

impl From<lettre::address::AddressError> for WardenError {
    fn from(value: lettre::address::AddressError) -> Self {
        Self::InvalidConfig {
            details: format!("bad email address: {value}"),
        }
    }
}
