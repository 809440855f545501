//! The monitor loop: tail → classify → threshold → publish.
//!
//! Owns every piece of engine state (matcher, windows, dedup set) as plain
//! fields, so independent monitor instances never share anything.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{error, info};

use crate::core::alert::{Alert, Severity};
use crate::core::config::MonitorConfig;
use crate::core::errors::Result;
use crate::engine::dedup::DedupSet;
use crate::engine::patterns::{ClassifiedEntry, PatternMatcher};
use crate::engine::threshold::ThresholdTracker;
use crate::notify::dispatch::DispatchHandle;
use crate::tailer::{LogLine, LogTailer, discover_log_files};

/// Warning alert messages carry at most this much of the source line.
const WARNING_MESSAGE_MAX_CHARS: usize = 300;

/// Single-file log monitor: discovery, tailing, classification, routing.
pub struct MonitorLoop {
    config: MonitorConfig,
    matcher: PatternMatcher,
    tracker: ThresholdTracker,
    dedup: DedupSet,
    dispatch: DispatchHandle,
    shutdown: Arc<AtomicBool>,
}

impl MonitorLoop {
    /// Build a monitor over the built-in rule tables.
    pub fn new(
        config: MonitorConfig,
        dispatch: DispatchHandle,
        shutdown: Arc<AtomicBool>,
    ) -> Result<Self> {
        let matcher =
            PatternMatcher::with_defaults(config.monitor_errors, config.monitor_warnings)?;
        let tracker = ThresholdTracker::new(config.time_window_minutes);
        let dedup = DedupSet::new(config.dedup_capacity);
        Ok(Self {
            config,
            matcher,
            tracker,
            dedup,
            dispatch,
            shutdown,
        })
    }

    /// Run until shutdown is requested or the tailer fails.
    ///
    /// A tailer failure is fatal: one best-effort critical alert goes out,
    /// then the error is surfaced to the caller. Restarting is the
    /// supervisor's business, not this loop's.
    pub fn run(&mut self) -> Result<()> {
        match self.tail_loop() {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(error = %err, "monitor loop failed");
                self.dispatch.publish(Alert::critical(
                    "Log Monitor Crashed",
                    format!("Monitor encountered an error: {err}"),
                ));
                Err(err)
            }
        }
    }

    fn tail_loop(&mut self) -> Result<()> {
        info!(
            log_path = %self.config.log_path.display(),
            errors = self.config.monitor_errors,
            warnings = self.config.monitor_warnings,
            threshold = self.config.error_threshold,
            window_minutes = self.config.time_window_minutes,
            "starting log monitor"
        );
        self.dispatch.publish(Alert::info(
            "Log Monitor Started",
            "Log monitoring has been initiated",
        ));

        let files = discover_log_files(&self.config.log_path, &self.config.primary_log)?;
        if files.len() > 1 {
            // Only the first discovered file is tailed; concurrent
            // multi-file tailing is out of scope for this monitor.
            info!(skipped = files.len() - 1, "additional log files not tailed");
        }
        let mut tailer = LogTailer::open(&files[0])?;

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        while !self.shutdown.load(Ordering::Relaxed) {
            let lines = tailer.poll()?;
            if lines.is_empty() {
                std::thread::sleep(poll_interval);
                continue;
            }
            for line in lines {
                self.process_line(&line);
            }
        }
        info!("shutdown requested, monitor loop exiting");
        Ok(())
    }

    /// Route one raw line through dedup, classification, and severity
    /// handling. Unmatched and duplicate lines produce no side effects
    /// beyond the dedup bookkeeping itself.
    pub fn process_line(&mut self, line: &LogLine) {
        if !self.dedup.insert(DedupSet::hash_of(&line.text)) {
            return;
        }
        let Some(entry) = self.matcher.classify(&line.text, line.observed_at) else {
            return;
        };
        match entry.severity {
            Severity::Error => self.handle_error(&entry),
            Severity::Warning => self.handle_warning(&entry),
            Severity::Info | Severity::Critical => {}
        }
    }

    /// Errors only alert once their window count reaches the threshold;
    /// the cooldown gate downstream is what keeps a sustained burst from
    /// paging on every subsequent line.
    fn handle_error(&mut self, entry: &ClassifiedEntry) {
        let count = self
            .tracker
            .record_and_count(&entry.pattern, entry.observed_at);
        if count < self.config.error_threshold {
            return;
        }
        let window = self.config.time_window_minutes;
        let alert = Alert::error(
            format!("Multiple {} Detected", title_case(&entry.pattern)),
            format!("Detected {count} errors in the last {window} minutes"),
        )
        .with_pattern(entry.pattern.to_string())
        .with_detail("Pattern", entry.pattern.to_string())
        .with_detail("Count", count.to_string())
        .with_detail("Time Window", format!("{window} minutes"))
        .with_detail(
            "Latest Error",
            excerpt(&entry.message, self.config.excerpt_max_chars),
        )
        .at(entry.observed_at);
        self.dispatch.publish(alert);
    }

    /// Every matching warning line is alert-eligible; only the cooldown
    /// gate rate-limits them.
    fn handle_warning(&mut self, entry: &ClassifiedEntry) {
        let alert = Alert::warning(
            format!("Media Server Warning: {}", title_case(&entry.pattern)),
            excerpt(&entry.message, WARNING_MESSAGE_MAX_CHARS),
        )
        .with_pattern(entry.pattern.to_string())
        .with_detail("Pattern", entry.pattern.to_string())
        .with_detail(
            "Timestamp",
            entry.observed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
        .at(entry.observed_at);
        self.dispatch.publish(alert);
    }
}

/// `database_error` → `Database Error`.
#[must_use]
pub fn title_case(pattern: &str) -> String {
    pattern
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Char-safe prefix of `message`, at most `max_chars` characters.
#[must_use]
pub fn excerpt(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::{excerpt, title_case};

    #[test]
    fn title_case_splits_on_underscores() {
        assert_eq!(title_case("database_error"), "Database Error");
        assert_eq!(title_case("performance_warning"), "Performance Warning");
        assert_eq!(title_case("disk"), "Disk");
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("abcdef", 4), "abcd");
        assert_eq!(excerpt("héllo wörld", 5), "héllo");
        assert_eq!(excerpt("short", 200), "short");
    }
}
