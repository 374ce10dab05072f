pub mod dispatch;
pub mod field;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::decode::{Decoded, Decoder, DecoderConfig};
use crate::rules::{categories_of, RuleEngine};
use crate::sanitize::SanitizePipeline;
use crate::verdict::{Category, RuleHit};

pub use self::dispatch::{FieldAction, SettingsHandle, ShieldDispatcher, ShieldMessage, ShieldSettings};
pub use self::field::{EventKind, FieldEvent, FieldInfo};

/// What the shield decided about one piece of text.
#[derive(Debug, Clone, Serialize)]
pub struct ShieldOutcome {
    /// True when a threat was confirmed and `cleaned` should replace the field value.
    pub acted: bool,
    pub cleaned: String,
    pub hits: BTreeSet<RuleHit>,
    pub decoded: Decoded,
}

impl ShieldOutcome {
    fn clean(original: &str, decoded: Decoded) -> Self {
        Self {
            acted: false,
            cleaned: original.to_string(),
            hits: BTreeSet::new(),
            decoded,
        }
    }

    pub fn categories(&self) -> BTreeSet<Category> {
        categories_of(&self.hits)
    }
}

/// Result of running detect-then-clean over one string.
struct PipelineRun {
    cleaned: String,
    hits: Vec<RuleHit>,
    changed: bool,
}

/// Decode, classify and clean user-entered text.
///
/// Runs synchronously and never fails, so it can sit directly inside a
/// keystroke or paste handler.
pub struct InputShield {
    decoder: Decoder,
    rules: RuleEngine,
    cleaners: SanitizePipeline,
}

impl Default for InputShield {
    fn default() -> Self {
        Self::new(DecoderConfig::shield())
    }
}

impl InputShield {
    pub fn new(decoder: DecoderConfig) -> Self {
        Self {
            decoder: Decoder::new(decoder),
            rules: RuleEngine::shield(),
            cleaners: SanitizePipeline::for_categories(&[Category::Xss, Category::Sqli].into()),
        }
    }

    pub fn analyze_and_sanitize(&self, original: &str) -> ShieldOutcome {
        let decoded = self.decoder.decode(original);

        if self.rules.is_prose(original, &decoded.text) {
            return ShieldOutcome::clean(original, decoded);
        }

        let from_decoded = self.run_pipeline(&decoded.text);
        let from_original = self.run_pipeline(original);

        if from_decoded.hits.is_empty() && from_original.hits.is_empty() {
            return ShieldOutcome::clean(original, decoded);
        }

        // Prefer the decoded variant when cleaning it changed something;
        // a confirmed threat never hands back the untouched original.
        let cleaned = if from_decoded.changed || !from_original.changed {
            from_decoded.cleaned
        } else {
            from_original.cleaned
        };

        let hits: BTreeSet<RuleHit> = from_decoded
            .hits
            .into_iter()
            .chain(from_original.hits)
            .collect();
        tracing::debug!(
            hits = hits.len(),
            layers = decoded.trace.len(),
            "input shield confirmed payload"
        );

        ShieldOutcome {
            acted: true,
            cleaned,
            hits,
            decoded,
        }
    }

    /// Each layer detects on what the previous layer left and only cleans
    /// when its own category matched, so SQL detection sees the text after
    /// XSS removal.
    fn run_pipeline(&self, text: &str) -> PipelineRun {
        let mut current = text.to_string();
        let mut hits = Vec::new();

        for layer in self.cleaners.layers() {
            let found = self.rules.hits_for(layer.category(), &current);
            if found.is_empty() {
                continue;
            }
            tracing::trace!(layer = layer.name(), hits = found.len(), "cleaning");
            current = layer.sanitize(&current);
            hits.extend(found);
        }

        PipelineRun {
            changed: current != text,
            cleaned: current,
            hits,
        }
    }
}
