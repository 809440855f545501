//! `mlw status`: resolved configuration, host metrics, media-server status.

use colored::Colorize;
use serde_json::json;

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::media::MediaServerClient;
use crate::metrics::HostMetrics;

const GIB: f64 = 1_073_741_824.0;

/// Render the status report to stdout.
pub fn run(config: &Config, json_mode: bool) -> Result<()> {
    let mut metrics = HostMetrics::new();
    let host = metrics.snapshot();
    let media = MediaServerClient::new(config.media_server.clone())?;
    let media_status = media.status();

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "version": env!("CARGO_PKG_VERSION"),
                "monitor": {
                    "logPath": config.monitor.log_path.display().to_string(),
                    "errorThreshold": config.monitor.error_threshold,
                    "timeWindowMinutes": config.monitor.time_window_minutes,
                    "alertCooldownMinutes": config.monitor.alert_cooldown_minutes,
                },
                "host": host,
                "mediaServer": media_status,
            }))?
        );
        return Ok(());
    }

    println!("{} v{}", "Media Log Warden".bold(), env!("CARGO_PKG_VERSION"));
    println!();
    println!("{}", "Monitor".bold().underline());
    println!("  log path:  {}", config.monitor.log_path.display());
    println!(
        "  errors:    threshold {} within {} minutes",
        config.monitor.error_threshold, config.monitor.time_window_minutes
    );
    println!(
        "  cooldown:  {} minutes between repeated alerts",
        config.monitor.alert_cooldown_minutes
    );
    println!();
    println!("{}", "Host".bold().underline());
    println!("  cpu:       {:.1}%", host.cpu_usage_percent);
    println!(
        "  memory:    {:.1} / {:.1} GiB",
        host.memory_used_bytes as f64 / GIB,
        host.memory_total_bytes as f64 / GIB
    );
    for disk in &host.disks {
        println!(
            "  disk:      {} — {:.1} GiB free of {:.1} GiB",
            disk.mount_point,
            disk.available_bytes as f64 / GIB,
            disk.total_bytes as f64 / GIB
        );
    }
    println!();
    println!("{}", "Media server".bold().underline());
    match media_status {
        Some(status) => {
            println!(
                "  {} on {} — {} active session(s), {} libraries",
                status.version.green(),
                status.platform,
                status.sessions,
                status.libraries
            );
            for session in media.active_sessions() {
                let mode = if session.transcoding {
                    "transcoding".yellow()
                } else {
                    "direct play".green()
                };
                println!(
                    "    {} — {} ({}, {mode})",
                    session.user, session.title, session.state
                );
            }
        }
        None => println!("  {}", "unavailable".dimmed()),
    }
    Ok(())
}
