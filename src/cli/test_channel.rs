//! `mlw test-channel`: send a test alert through one configured channel.

use colored::Colorize;
use serde_json::json;

use crate::core::alert::Alert;
use crate::core::config::Config;
use crate::core::errors::{Result, WardenError};
use crate::notify::providers::build_channels;

/// Deliver a test alert through the channel named `id`.
pub fn run(config: &Config, id: &str, json_mode: bool) -> Result<()> {
    let channels = build_channels(&config.channels)?;
    let channel = channels
        .iter()
        .find(|channel| channel.id() == id)
        .ok_or_else(|| WardenError::Channel {
            channel: id.to_string(),
            details: "not enabled or not configured".to_string(),
        })?;

    let alert = Alert::info(
        "Test Notification",
        "This is a test notification from media-log-warden",
    );
    let outcome = channel.deliver(&alert)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "channel": id,
                "success": outcome.success,
                "detail": outcome.detail,
            }))?
        );
    } else if outcome.success {
        println!("{} test alert delivered via {id}", "ok".green().bold());
    } else {
        println!("{} {id}: {}", "failed".red().bold(), outcome.detail);
    }
    Ok(())
}
