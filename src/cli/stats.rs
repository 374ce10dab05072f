use chrono::Utc;

use crate::config::ShieldConfig;
use crate::error::Result;
use crate::storage::json::JsonStatsStore;
use crate::storage::{summarize, StatsStore};

pub fn run(config: &ShieldConfig, days: u32, reset: bool) -> Result<()> {
    let store = JsonStatsStore::new(config.stats_path());
    let today = Utc::now().date_naive();

    if reset {
        store.reset_day(today)?;
        eprintln!("inputshield: reset counters for {}", today);
        return Ok(());
    }

    let summary = summarize(&store.load()?, today, days);

    println!("inputshield statistics");
    println!("=======================");
    println!("Sanitized today: {}", summary.today);
    println!();

    println!("Last {} day(s):", summary.days.len());
    for day in &summary.days {
        println!("  {}: {}", day.day, day.count);
    }

    println!("\nTop patterns:");
    if summary.top_patterns.is_empty() {
        println!("  (none)");
    }
    for (pattern, count) in &summary.top_patterns {
        println!("  {}: {}", pattern, count);
    }

    Ok(())
}
