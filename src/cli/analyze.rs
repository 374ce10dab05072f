use std::sync::Arc;

use crate::analyzer::{HttpEnricher, UrlAnalyzer};
use crate::config::ShieldConfig;
use crate::error::Result;

/// Analyze one URL and print the report as pretty JSON on stdout.
pub async fn run(config: &ShieldConfig, url: &str, offline: bool) -> Result<()> {
    let analyzer = UrlAnalyzer::new(config.url_decoder());

    let report = if offline {
        analyzer.analyze_local(url)
    } else {
        let enricher = HttpEnricher::from_config(&config.backend);
        analyzer.with_enricher(Arc::new(enricher)).analyze(url).await
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!(
        "inputshield: {} (score {}{})",
        report.verdict,
        report.score,
        if report.fatal { ", fatal" } else { "" }
    );
    Ok(())
}
