pub mod json;
pub mod memory;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::verdict::Category;

/// Per-day sanitizing counters, keyed by calendar day.
pub type DailyStats = BTreeMap<NaiveDate, DayStats>;

/// Counters for a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    /// Number of sanitizing actions.
    pub count: u64,

    /// Actions per category name. One action can bump several categories.
    #[serde(default)]
    pub patterns: BTreeMap<String, u64>,
}

impl DayStats {
    pub fn record(&mut self, categories: &BTreeSet<Category>) {
        self.count += 1;
        for category in categories {
            *self.patterns.entry(category.as_str().to_string()).or_insert(0) += 1;
        }
    }
}

/// Backend for the persisted usage statistics.
pub trait StatsStore: Send + Sync {
    /// Load every recorded day.
    fn load(&self) -> Result<DailyStats>;

    /// Count one sanitizing action on `day` for the given categories.
    fn record(&self, day: NaiveDate, categories: &BTreeSet<Category>) -> Result<()>;

    /// Zero the counters for `day`.
    fn reset_day(&self, day: NaiveDate) -> Result<()>;

    /// Counters for a single day (zero if nothing was recorded).
    fn day(&self, day: NaiveDate) -> Result<DayStats> {
        Ok(self.load()?.remove(&day).unwrap_or_default())
    }
}

/// One bar of the trailing-window chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: u64,
}

/// Aggregates for reporting over a trailing window ending today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub today: u64,
    /// Oldest first, one entry per day including empty ones.
    pub days: Vec<DayCount>,
    /// At most [`TOP_PATTERNS`] categories, most frequent first.
    pub top_patterns: Vec<(String, u64)>,
}

/// Number of categories listed in [`StatsSummary::top_patterns`].
pub const TOP_PATTERNS: usize = 5;

/// Longest window [`summarize`] will walk.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Summarize the `window` days ending with `today`, clamped to
/// `1..=MAX_WINDOW_DAYS`.
pub fn summarize(stats: &DailyStats, today: NaiveDate, window: u32) -> StatsSummary {
    let window = window.clamp(1, MAX_WINDOW_DAYS);
    let mut days = Vec::with_capacity(window as usize);
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();

    for back in (0..window).rev() {
        let Some(day) = today.checked_sub_days(Days::new(u64::from(back))) else {
            continue;
        };
        let entry = stats.get(&day);
        days.push(DayCount {
            day,
            count: entry.map(|e| e.count).unwrap_or(0),
        });
        if let Some(entry) = entry {
            for (pattern, n) in &entry.patterns {
                *totals.entry(pattern.clone()).or_insert(0) += n;
            }
        }
    }

    let mut top_patterns: Vec<(String, u64)> = totals.into_iter().collect();
    top_patterns.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_patterns.truncate(TOP_PATTERNS);

    StatsSummary {
        today: stats.get(&today).map(|e| e.count).unwrap_or(0),
        days,
        top_patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_clamped() {
        let today = day("2024-03-10");
        assert_eq!(summarize(&DailyStats::new(), today, u32::MAX).days.len(), 366);
        assert_eq!(summarize(&DailyStats::new(), today, 0).days.len(), 1);
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_record_counts_action_once() {
        let mut stats = DayStats::default();
        let cats: BTreeSet<_> = [Category::Xss, Category::Sqli].into_iter().collect();
        stats.record(&cats);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.patterns.get("xss"), Some(&1));
        assert_eq!(stats.patterns.get("sqli"), Some(&1));
    }

    #[test]
    fn test_summary_window_includes_empty_days() {
        let mut stats = DailyStats::new();
        let mut entry = DayStats::default();
        entry.record(&[Category::Sqli].into_iter().collect());
        stats.insert(day("2026-10-14"), entry);
        // Outside the window.
        stats.insert(
            day("2026-10-01"),
            DayStats {
                count: 9,
                patterns: [("xss".to_string(), 9)].into_iter().collect(),
            },
        );

        let summary = summarize(&stats, day("2026-10-16"), 3);
        assert_eq!(summary.today, 0);
        assert_eq!(
            summary.days,
            vec![
                DayCount { day: day("2026-10-14"), count: 1 },
                DayCount { day: day("2026-10-15"), count: 0 },
                DayCount { day: day("2026-10-16"), count: 0 },
            ]
        );
        assert_eq!(summary.top_patterns, vec![("sqli".to_string(), 1)]);
    }
}
