//! `mlw check`: one-shot classification scan over an existing log file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::Utc;
use colored::Colorize;
use serde_json::json;

use crate::core::alert::Severity;
use crate::core::config::Config;
use crate::core::errors::{Result, WardenError};
use crate::engine::patterns::PatternMatcher;

/// Scan `file` once with the configured rule tables and summarize matches.
pub fn run(config: &Config, file: &Path, json_mode: bool) -> Result<()> {
    let matcher = PatternMatcher::with_defaults(
        config.monitor.monitor_errors,
        config.monitor.monitor_warnings,
    )?;
    let reader = BufReader::new(File::open(file).map_err(|source| WardenError::io(file, source))?);

    let mut total_lines = 0usize;
    let mut counts: BTreeMap<String, (Severity, usize)> = BTreeMap::new();
    for line in reader.lines() {
        let line = line.map_err(|source| WardenError::io(file, source))?;
        total_lines += 1;
        if let Some(entry) = matcher.classify(&line, Utc::now()) {
            counts
                .entry(entry.pattern.to_string())
                .or_insert((entry.severity, 0))
                .1 += 1;
        }
    }

    if json_mode {
        let matches: Vec<_> = counts
            .iter()
            .map(|(pattern, (severity, count))| {
                json!({"pattern": pattern, "severity": severity, "count": count})
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "file": file.display().to_string(),
                "totalLines": total_lines,
                "matches": matches,
            }))?
        );
        return Ok(());
    }

    println!(
        "{} {} ({} lines)",
        "scanned".bold(),
        file.display(),
        total_lines
    );
    if counts.is_empty() {
        println!("  no matching error or warning lines");
        return Ok(());
    }
    for (pattern, (severity, count)) in &counts {
        let label = match severity {
            Severity::Error | Severity::Critical => severity.to_string().red(),
            Severity::Warning => severity.to_string().yellow(),
            Severity::Info => severity.to_string().normal(),
        };
        println!("  {label:>8}  {pattern:<24} {count}");
    }
    Ok(())
}
