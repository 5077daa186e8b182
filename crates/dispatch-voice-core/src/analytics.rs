//! Bounded history of consumed announcements.

use crate::alert::{AlertType, AnalyticsEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Entries kept before the oldest are evicted
pub const ANALYTICS_CAPACITY: usize = 100;

/// Aggregate view of the retained entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Retained entries
    pub total: usize,
    /// Entries that played to the end
    pub acknowledged: usize,
    /// Entries per alert type name
    pub by_type: BTreeMap<String, usize>,
    /// Mean duration in milliseconds, `None` when empty
    pub mean_duration_ms: Option<f64>,
}

/// Ring of the most recent entries, oldest first
#[derive(Debug, Clone)]
pub struct AnalyticsLog {
    entries: VecDeque<AnalyticsEntry>,
    capacity: usize,
}

impl Default for AnalyticsLog {
    fn default() -> Self {
        Self::with_capacity(ANALYTICS_CAPACITY)
    }
}

impl AnalyticsLog {
    /// Log holding at most `capacity` entries
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn record(&mut self, entry: AnalyticsEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Copy of the entries, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<AnalyticsEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of retained entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is retained
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries of one type
    #[must_use]
    pub fn count_of(&self, alert_type: AlertType) -> usize {
        self.entries.iter().filter(|e| e.alert_type == alert_type).count()
    }

    /// Aggregate the retained entries
    #[must_use]
    pub fn summary(&self) -> AnalyticsSummary {
        let mut summary = AnalyticsSummary {
            total: self.entries.len(),
            ..AnalyticsSummary::default()
        };
        let mut total_ms: u128 = 0;

        for entry in &self.entries {
            if entry.acknowledged {
                summary.acknowledged += 1;
            }
            *summary
                .by_type
                .entry(entry.alert_type.as_str().to_string())
                .or_insert(0) += 1;
            total_ms += u128::from(entry.duration_ms);
        }

        if summary.total > 0 {
            #[allow(clippy::cast_precision_loss)]
            let mean = total_ms as f64 / summary.total as f64;
            summary.mean_duration_ms = Some(mean);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(alert_type: AlertType, duration_ms: u64, acknowledged: bool) -> AnalyticsEntry {
        AnalyticsEntry {
            timestamp: Utc::now(),
            alert_type,
            duration_ms,
            acknowledged,
        }
    }

    #[test]
    fn test_capacity_keeps_most_recent() {
        let mut log = AnalyticsLog::default();
        for i in 0..150 {
            log.record(entry(AlertType::Call, i, true));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), ANALYTICS_CAPACITY);
        assert_eq!(entries[0].duration_ms, 50);
        assert_eq!(entries[99].duration_ms, 149);
    }

    #[test]
    fn test_summary() {
        let mut log = AnalyticsLog::default();
        assert_eq!(log.summary().mean_duration_ms, None);

        log.record(entry(AlertType::Call, 100, true));
        log.record(entry(AlertType::Call, 300, false));
        log.record(entry(AlertType::Panic, 200, true));

        let summary = log.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.acknowledged, 2);
        assert_eq!(summary.by_type.get("call"), Some(&2));
        assert_eq!(summary.by_type.get("panic"), Some(&1));
        assert_eq!(summary.mean_duration_ms, Some(200.0));
        assert_eq!(log.count_of(AlertType::Call), 2);
    }

    #[test]
    fn test_clear_and_zero_capacity() {
        let mut log = AnalyticsLog::with_capacity(0);
        log.record(entry(AlertType::Admin, 1, true));
        assert!(log.is_empty());

        let mut log = AnalyticsLog::default();
        log.record(entry(AlertType::Admin, 1, true));
        log.clear();
        assert_eq!(log.len(), 0);
    }
}
