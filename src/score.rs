use serde::{Deserialize, Serialize};

use crate::rules::UrlSignal;
use crate::verdict::{RiskScore, Verdict};

/// Accumulated score plus the reasons that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub risk: RiskScore,
    pub reasons: Vec<String>,
}

impl ScoreCard {
    /// Add one URL-structure signal.
    pub fn push(&mut self, signal: &UrlSignal) {
        self.risk.add(signal.weight(), signal.is_fatal());
        self.reasons.push(signal.reason());
    }

    /// Fold in a score computed elsewhere, e.g. by the enrichment backend.
    pub fn merge(&mut self, risk: RiskScore, reasons: impl IntoIterator<Item = String>) {
        self.risk.merge(risk);
        self.reasons.extend(reasons);
    }

    /// Append an informational reason that carries no weight.
    pub fn note(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    pub fn verdict(&self) -> Verdict {
        self.risk.verdict()
    }
}

/// Sum the weights of `signals`; any fatal signal sets the fatal flag.
pub fn score(signals: &[UrlSignal]) -> ScoreCard {
    let mut card = ScoreCard::default();
    for signal in signals {
        card.push(signal);
    }
    card
}
