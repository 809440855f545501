//! Per-pattern sliding-window counters for burst detection.

use std::collections::HashMap;
use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// Sliding-window occurrence counter, one window per error pattern.
///
/// The tracker only counts; it never suppresses repeated crossings. Every
/// occurrence after the threshold is reached will keep reporting a count at
/// or above it until the window drains — rate limiting of the resulting
/// notifications is the cooldown gate's job.
#[derive(Debug)]
pub struct ThresholdTracker {
    window: Duration,
    windows: HashMap<String, VecDeque<DateTime<Utc>>>,
}

impl ThresholdTracker {
    /// Create a tracker with the given window length in minutes.
    #[must_use]
    pub fn new(window_minutes: u64) -> Self {
        Self {
            window: Duration::minutes(i64::try_from(window_minutes).unwrap_or(i64::MAX)),
            windows: HashMap::new(),
        }
    }

    /// Record one occurrence of `pattern` at `at` and return the number of
    /// occurrences still inside the window, the new one included.
    ///
    /// Timestamps older than `at - window` are evicted before the insert, so
    /// every retained timestamp lies within `[at - window, at]`.
    pub fn record_and_count(&mut self, pattern: &str, at: DateTime<Utc>) -> usize {
        let window = self.window;
        let entries = self
            .windows
            .entry(pattern.to_string())
            .or_default();
        entries.retain(|ts| at.signed_duration_since(*ts) <= window);
        entries.push_back(at);
        entries.len()
    }

    /// Current in-window count for `pattern` without recording an occurrence.
    #[must_use]
    pub fn count(&self, pattern: &str, now: DateTime<Utc>) -> usize {
        self.windows.get(pattern).map_or(0, |entries| {
            entries
                .iter()
                .filter(|ts| now.signed_duration_since(**ts) <= self.window)
                .count()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ThresholdTracker;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    #[test]
    fn fifth_occurrence_reaches_threshold_of_five() {
        let mut tracker = ThresholdTracker::new(5);
        let start = Utc::now();
        for i in 0..4 {
            let count = tracker.record_and_count("database_error", start + Duration::seconds(i));
            assert!(count < 5, "count {count} crossed early");
        }
        let count = tracker.record_and_count("database_error", start + Duration::seconds(4));
        assert_eq!(count, 5);
    }

    #[test]
    fn occurrences_outside_window_do_not_count() {
        let mut tracker = ThresholdTracker::new(5);
        let start = Utc::now();
        for i in 0..4 {
            tracker.record_and_count("database_error", start + Duration::seconds(i));
        }
        // A gap wider than the window empties it; four more never reach five.
        let later = start + Duration::minutes(6);
        for i in 0..4 {
            let count = tracker.record_and_count("database_error", later + Duration::seconds(i));
            assert!(count < 5, "stale timestamps leaked into the window");
        }
    }

    #[test]
    fn repeated_crossings_keep_reporting_at_or_above_threshold() {
        let mut tracker = ThresholdTracker::new(5);
        let start = Utc::now();
        for i in 0..5 {
            tracker.record_and_count("stream_error", start + Duration::seconds(i));
        }
        let sixth = tracker.record_and_count("stream_error", start + Duration::seconds(5));
        assert!(sixth >= 5, "tracker must not suppress repeated crossings");
    }

    #[test]
    fn patterns_track_independent_windows() {
        let mut tracker = ThresholdTracker::new(5);
        let now = Utc::now();
        tracker.record_and_count("stream_error", now);
        tracker.record_and_count("stream_error", now);
        assert_eq!(tracker.record_and_count("disk_error", now), 1);
        assert_eq!(tracker.count("stream_error", now), 2);
    }

    proptest! {
        #[test]
        fn count_never_exceeds_events_inside_window(
            offsets in prop::collection::vec(0i64..600, 1..60)
        ) {
            let mut sorted = offsets.clone();
            sorted.sort_unstable();
            let start = Utc::now();
            let mut tracker = ThresholdTracker::new(5);
            for (i, offset) in sorted.iter().enumerate() {
                let at = start + Duration::seconds(*offset);
                let count = tracker.record_and_count("p", at);
                let in_window = sorted[..=i]
                    .iter()
                    .filter(|o| *offset - **o <= 300)
                    .count();
                prop_assert_eq!(count, in_window);
            }
        }
    }
}
