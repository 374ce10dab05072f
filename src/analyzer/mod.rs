pub mod enrich;
pub mod report;

use std::sync::Arc;

use crate::decode::{Decoder, DecoderConfig};
use crate::error::ShieldError;
use crate::rules::{inspect, RuleEngine, UrlSignal};

pub use self::enrich::{
    ApiResponse, DnsSnapshot, EndpointResolver, Enricher, EnrichmentData, HttpEnricher,
    RedirectHop, TlsInfo, WhoisRecord,
};
pub use self::report::{Report, ReportBuilder};

/// Reason appended when the backend could not be reached in time.
pub const ENRICHMENT_UNAVAILABLE: &str = "Backend enrichment unavailable";

/// URL risk analysis: decode, structural checks, scoring, optional enrichment.
pub struct UrlAnalyzer {
    decoder: Decoder,
    rules: RuleEngine,
    enricher: Option<Arc<dyn Enricher>>,
}

impl Default for UrlAnalyzer {
    fn default() -> Self {
        Self::new(DecoderConfig::url())
    }
}

impl UrlAnalyzer {
    pub fn new(decoder: DecoderConfig) -> Self {
        Self {
            decoder: Decoder::new(decoder),
            rules: RuleEngine::url(),
            enricher: None,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Local findings plus the decoded URL to enrich, if it parsed.
    fn local(&self, raw: &str) -> (ReportBuilder, Option<String>) {
        let decoded = self.decoder.decode(raw.trim());
        let inspection = inspect(&decoded.text);
        let hits = self.rules.classify(&decoded.text);
        tracing::debug!(
            signals = ?inspection.signals,
            layers = decoded.trace.len(),
            "local url analysis"
        );
        let target = (!inspection.has(&UrlSignal::Invalid)).then(|| decoded.text.clone());
        (ReportBuilder::new(decoded, inspection, hits), target)
    }

    /// Decoding and structural scoring only; never touches the network.
    pub fn analyze_local(&self, raw: &str) -> Report {
        self.local(raw).0.build()
    }

    /// Full analysis. Enrichment failures only add a reason; the local
    /// verdict is always returned.
    pub async fn analyze(&self, raw: &str) -> Report {
        let (builder, target) = self.local(raw);
        let (Some(enricher), Some(url)) = (&self.enricher, target) else {
            return builder.build();
        };

        match enricher.enrich(&url).await {
            Ok(data) => builder.enrichment(data).build(),
            Err(ShieldError::BackendRejected { reason }) => {
                tracing::warn!(%reason, "enrichment backend returned an error");
                builder.note(format!("Server: {}", reason)).build()
            }
            Err(e) => {
                tracing::warn!(error = %e, "enrichment unavailable");
                builder.note(ENRICHMENT_UNAVAILABLE).build()
            }
        }
    }
}
