//! Ordered regex rule tables with first-match-wins classification.
//!
//! Rule order is a contract: the earliest-declared matching rule wins, so
//! more specific categories must be declared before broader ones.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::core::alert::Severity;
use crate::core::errors::{Result, WardenError};

/// Built-in error rules, in evaluation order.
const DEFAULT_ERROR_RULES: &[(&str, &str)] = &[
    ("stream_error", r"(?i)ERROR.*stream|ERROR.*playback|ERROR.*transcode"),
    ("database_error", r"(?i)ERROR.*database|ERROR.*sqlite|ERROR.*corruption"),
    ("network_error", r"(?i)ERROR.*network|ERROR.*connection|ERROR.*timeout"),
    ("auth_error", r"(?i)ERROR.*authentication|ERROR.*unauthorized|ERROR.*token"),
    ("scanner_error", r"(?i)ERROR.*scanner|ERROR.*metadata|ERROR.*library"),
    ("disk_error", r"(?i)ERROR.*disk|ERROR.*i/o error|ERROR.*read error"),
];

/// Built-in warning rules, in evaluation order.
const DEFAULT_WARNING_RULES: &[(&str, &str)] = &[
    ("transcoding_warning", r"(?i)WARN.*transcode|WARN.*codec"),
    ("performance_warning", r"(?i)WARN.*slow|WARN.*performance|WARN.*timeout"),
    ("permission_warning", r"(?i)WARN.*permission|WARN.*access denied"),
];

/// A single named classification rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Stable rule name, e.g. `database_error`.
    pub name: Cow<'static, str>,
    regex: Regex,
}

impl PatternRule {
    /// Compile a rule. The pattern itself must carry `(?i)` if it is meant
    /// to be case-insensitive; the built-in tables all do.
    pub fn new(name: impl Into<Cow<'static, str>>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|err| WardenError::PatternCompile {
            name: name.to_string(),
            details: err.to_string(),
        })?;
        Ok(Self { name, regex })
    }

    /// Whether `line` matches this rule.
    #[must_use]
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// One log line attributed to a rule.
#[derive(Debug, Clone)]
pub struct ClassifiedEntry {
    /// Name of the rule that matched first.
    pub pattern: Cow<'static, str>,
    /// Severity of the matched rule table.
    pub severity: Severity,
    /// Trimmed line text.
    pub message: String,
    /// Arrival time of the line.
    pub observed_at: DateTime<Utc>,
}

/// Classifies single log lines against the error and warning rule tables.
///
/// Pure over its rule tables: `classify` has no side effects and no per-call
/// mutable state.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    error_rules: Vec<PatternRule>,
    warning_rules: Vec<PatternRule>,
    monitor_errors: bool,
    monitor_warnings: bool,
}

impl PatternMatcher {
    /// Build a matcher over the built-in rule tables.
    pub fn with_defaults(monitor_errors: bool, monitor_warnings: bool) -> Result<Self> {
        Ok(Self::from_rules(
            compile_table(DEFAULT_ERROR_RULES)?,
            compile_table(DEFAULT_WARNING_RULES)?,
            monitor_errors,
            monitor_warnings,
        ))
    }

    /// Build a matcher over caller-supplied rule tables, preserving order.
    #[must_use]
    pub fn from_rules(
        error_rules: Vec<PatternRule>,
        warning_rules: Vec<PatternRule>,
        monitor_errors: bool,
        monitor_warnings: bool,
    ) -> Self {
        Self {
            error_rules,
            warning_rules,
            monitor_errors,
            monitor_warnings,
        }
    }

    /// Classify one line. Error rules are evaluated before warning rules;
    /// within each table the first match wins. Disabled tables are skipped
    /// entirely. A line matching no enabled rule yields `None`.
    #[must_use]
    pub fn classify(&self, line: &str, observed_at: DateTime<Utc>) -> Option<ClassifiedEntry> {
        if self.monitor_errors
            && let Some(rule) = first_match(&self.error_rules, line)
        {
            return Some(entry(rule, Severity::Error, line, observed_at));
        }
        if self.monitor_warnings
            && let Some(rule) = first_match(&self.warning_rules, line)
        {
            return Some(entry(rule, Severity::Warning, line, observed_at));
        }
        None
    }
}

fn compile_table(table: &[(&'static str, &str)]) -> Result<Vec<PatternRule>> {
    table
        .iter()
        .map(|(name, pattern)| PatternRule::new(*name, pattern))
        .collect()
}

fn first_match<'a>(rules: &'a [PatternRule], line: &str) -> Option<&'a PatternRule> {
    rules.iter().find(|rule| rule.is_match(line))
}

fn entry(
    rule: &PatternRule,
    severity: Severity,
    line: &str,
    observed_at: DateTime<Utc>,
) -> ClassifiedEntry {
    ClassifiedEntry {
        pattern: rule.name.clone(),
        severity,
        message: line.trim().to_string(),
        observed_at,
    }
}
