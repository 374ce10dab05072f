use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::error::{Result, ShieldError};
use crate::verdict::Category;

use super::{DailyStats, DayStats, StatsStore};

/// Statistics kept in a single JSON document: `{ "YYYY-MM-DD": { count, patterns } }`.
pub struct JsonStatsStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonStatsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<DailyStats> {
        if !self.path.exists() {
            return Ok(DailyStats::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(DailyStats::new());
        }
        serde_json::from_str(&contents).map_err(|e| ShieldError::Storage {
            reason: format!("malformed stats file {}: {}", self.path.display(), e),
        })
    }

    fn write(&self, stats: &DailyStats) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(stats)?;
        fs::write(&self.path, json).map_err(|e| ShieldError::Storage {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut DailyStats),
    {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut stats = self.read()?;
        f(&mut stats);
        self.write(&stats)
    }
}

impl StatsStore for JsonStatsStore {
    fn load(&self) -> Result<DailyStats> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read()
    }

    fn record(&self, day: NaiveDate, categories: &BTreeSet<Category>) -> Result<()> {
        self.update(|stats| stats.entry(day).or_default().record(categories))
    }

    fn reset_day(&self, day: NaiveDate) -> Result<()> {
        self.update(|stats| {
            stats.insert(day, DayStats::default());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStatsStore::new(tmp.path().join("stats.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_record_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("stats.json");
        let cats: BTreeSet<_> = [Category::Xss].into_iter().collect();

        JsonStatsStore::new(path.clone())
            .record(day("2026-10-16"), &cats)
            .unwrap();
        JsonStatsStore::new(path.clone())
            .record(day("2026-10-16"), &cats)
            .unwrap();

        let loaded = JsonStatsStore::new(path.clone()).day(day("2026-10-16")).unwrap();
        assert_eq!(loaded.count, 2);
        assert_eq!(loaded.patterns.get("xss"), Some(&2));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"2026-10-16\""));
    }

    #[test]
    fn test_malformed_file_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stats.json");
        fs::write(&path, "{not json").unwrap();
        let err = JsonStatsStore::new(path).load().unwrap_err();
        assert!(matches!(err, ShieldError::Storage { .. }));
    }
}
