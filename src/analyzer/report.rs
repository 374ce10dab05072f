use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::decode::Decoded;
use crate::rules::UrlInspection;
use crate::score::{score, ScoreCard};
use crate::verdict::{RiskScore, RuleHit, Verdict};

use super::enrich::{DnsSnapshot, EnrichmentData, RedirectHop, TlsInfo, WhoisRecord};

/// Composite result of analyzing one URL. Enrichment fields are `None` when
/// the backend was not consulted or did not answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub verdict: Verdict,
    pub score: u32,
    pub fatal: bool,
    pub reasons: Vec<String>,
    pub hits: BTreeSet<RuleHit>,
    pub final_url: String,
    pub hostname: Option<String>,
    pub decoding: Decoded,
    pub chain: Option<Vec<RedirectHop>>,
    pub dns: Option<DnsSnapshot>,
    pub whois: Option<WhoisRecord>,
    pub tls: Option<TlsInfo>,
    pub recommendation: String,
}

/// Accumulates local and remote findings, then renders a [`Report`].
pub struct ReportBuilder {
    card: ScoreCard,
    hits: BTreeSet<RuleHit>,
    decoding: Decoded,
    hostname: Option<String>,
    enrichment: Option<EnrichmentData>,
}

impl ReportBuilder {
    /// `inspection` drives the score; `hits` are the classifier's findings
    /// for the same decoded text.
    pub fn new(decoding: Decoded, inspection: UrlInspection, hits: BTreeSet<RuleHit>) -> Self {
        let card = score(&inspection.signals);
        Self {
            card,
            hits,
            decoding,
            hostname: inspection.hostname,
            enrichment: None,
        }
    }

    /// Local score so far.
    pub fn risk(&self) -> RiskScore {
        self.card.risk
    }

    /// Merge backend findings. Remote score and reasons add to the local ones.
    pub fn enrichment(mut self, data: EnrichmentData) -> Self {
        self.card
            .merge(RiskScore::new(data.score, data.fatal), data.reasons.iter().cloned());
        self.enrichment = Some(data);
        self
    }

    /// Append a reason that does not affect the score.
    pub fn note(mut self, reason: impl Into<String>) -> Self {
        self.card.note(reason);
        self
    }

    pub fn build(self) -> Report {
        let verdict = self.card.verdict();
        let remote = self.enrichment.unwrap_or_default();
        Report {
            verdict,
            score: self.card.risk.score,
            fatal: self.card.risk.fatal,
            reasons: self.card.reasons,
            hits: self.hits,
            final_url: remote
                .final_url
                .unwrap_or_else(|| self.decoding.text.clone()),
            hostname: remote.hostname.or(self.hostname),
            decoding: self.decoding,
            chain: remote.chain,
            dns: remote.dns,
            whois: remote.whois,
            tls: remote.tls,
            recommendation: verdict.recommendation().to_string(),
        }
    }
}
