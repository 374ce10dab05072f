use std::io::Read;

use chrono::Utc;

use crate::config::ShieldConfig;
use crate::error::Result;
use crate::shield::InputShield;
use crate::storage::json::JsonStatsStore;
use crate::storage::StatsStore;

/// Clean `text` (or stdin) and print the result on stdout.
pub fn run(config: &ShieldConfig, text: Option<String>, paste: bool) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if !config.enabled {
        eprintln!("inputshield: shield disabled in config, leaving input unchanged");
        println!("{}", text);
        return Ok(());
    }

    let shield = InputShield::new(config.shield_decoder());
    let outcome = shield.analyze_and_sanitize(&text);

    if outcome.acted {
        for hit in &outcome.hits {
            eprintln!("  {}: {}", hit.category, hit.rule);
        }
        let notice = if paste {
            "Suspicious paste sanitized."
        } else {
            "Suspicious input sanitized."
        };
        eprintln!("inputshield: {}", notice);

        let store = JsonStatsStore::new(config.stats_path());
        if let Err(e) = store.record(Utc::now().date_naive(), &outcome.categories()) {
            tracing::warn!("failed to record sanitizer stats: {}", e);
        }
    }

    println!("{}", outcome.cleaned);
    Ok(())
}
