use std::collections::BTreeSet;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::Result;
use crate::verdict::Category;

use super::{DailyStats, DayStats, StatsStore};

/// Process-local statistics, for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryStatsStore {
    entries: RwLock<DailyStats>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsStore for MemoryStatsStore {
    fn load(&self) -> Result<DailyStats> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.clone())
    }

    fn record(&self, day: NaiveDate, categories: &BTreeSet<Category>) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.entry(day).or_default().record(categories);
        Ok(())
    }

    fn reset_day(&self, day: NaiveDate) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(day, DayStats::default());
        Ok(())
    }
}
