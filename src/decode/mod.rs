pub mod layers;

use serde::{Deserialize, Serialize};

/// Growth bound for the anti-expansion guard, relative to the input length.
pub const EXPANSION_FACTOR: usize = 4;

/// One reversible transformation the decoder knows how to undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingKind {
    Percent,
    HtmlEntity,
    UnicodeEscape,
    HexEscape,
    Base64,
    RawHex,
}

impl EncodingKind {
    /// Order in which layers are attempted within a single pass.
    pub const ORDER: [EncodingKind; 6] = [
        EncodingKind::Percent,
        EncodingKind::HtmlEntity,
        EncodingKind::UnicodeEscape,
        EncodingKind::HexEscape,
        EncodingKind::Base64,
        EncodingKind::RawHex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingKind::Percent => "percent",
            EncodingKind::HtmlEntity => "html-entity",
            EncodingKind::UnicodeEscape => "unicode-escape",
            EncodingKind::HexEscape => "hex-escape",
            EncodingKind::Base64 => "base64",
            EncodingKind::RawHex => "raw-hex",
        }
    }
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How HTML entities are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlMode {
    /// Numeric references plus `&amp; &lt; &gt; &quot; &apos;`.
    Basic,
    /// The full HTML5 named-entity table.
    Full,
}

/// Where base64 candidates are looked for and what counts as a plausible decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Base64Mode {
    /// A run delimited by query-string punctuation; decoded bytes must look like URL text.
    Anchored,
    /// The whole string is the candidate; decoded bytes must be printable UTF-8.
    Whole,
}

/// Parameters distinguishing the URL-analysis and input-shield decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub max_passes: usize,
    pub expansion_guard: bool,
    pub html: HtmlMode,
    pub base64: Base64Mode,
}

impl DecoderConfig {
    /// Preset used when scoring links.
    pub fn url() -> Self {
        Self {
            max_passes: 3,
            expansion_guard: true,
            html: HtmlMode::Basic,
            base64: Base64Mode::Anchored,
        }
    }

    /// Preset used by the input shield; interactive cleaning tolerates deeper nesting.
    pub fn shield() -> Self {
        Self {
            max_passes: 10,
            expansion_guard: false,
            html: HtmlMode::Full,
            base64: Base64Mode::Whole,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}

/// One successful decode pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeLayer {
    pub kind: EncodingKind,
    pub output: String,
}

/// Ordered record of the layers peeled off an input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodeTrace {
    layers: Vec<DecodeLayer>,
}

impl DecodeTrace {
    pub fn layers(&self) -> &[DecodeLayer] {
        &self.layers
    }

    pub fn kinds(&self) -> Vec<EncodingKind> {
        self.layers.iter().map(|l| l.kind).collect()
    }

    pub fn contains(&self, kind: EncodingKind) -> bool {
        self.layers.iter().any(|l| l.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Result of decoding: the recovered text and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    #[serde(rename = "final")]
    pub text: String,
    pub trace: DecodeTrace,
}

/// Bounded iterative multi-encoding decoder.
///
/// Each pass peels exactly one layer: the encodings in [`EncodingKind::ORDER`]
/// are tried in turn and the first one that changes the string wins. Decoding
/// stops at a fixed point, at `max_passes`, or when the expansion guard trips.
/// A step that fails to decode is a no-op, so `decode` itself cannot fail.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn decode(&self, input: &str) -> Decoded {
        let limit = input.chars().count().saturating_mul(EXPANSION_FACTOR);
        let mut current = input.to_string();
        let mut layers = Vec::new();

        for _ in 0..self.config.max_passes {
            let Some((kind, next)) = self.peel(&current) else {
                break;
            };
            if self.config.expansion_guard && next.chars().count() > limit {
                tracing::debug!(layer = %kind, "decode stopped: output exceeds expansion bound");
                break;
            }
            tracing::debug!(layer = %kind, pass = layers.len() + 1, "decoded layer");
            layers.push(DecodeLayer {
                kind,
                output: next.clone(),
            });
            current = next;
        }

        Decoded {
            text: current,
            trace: DecodeTrace { layers },
        }
    }

    /// Try each encoding in order; return the first that changes the input.
    fn peel(&self, input: &str) -> Option<(EncodingKind, String)> {
        EncodingKind::ORDER.into_iter().find_map(|kind| {
            self.apply(kind, input)
                .filter(|out| out != input)
                .map(|out| (kind, out))
        })
    }

    fn apply(&self, kind: EncodingKind, input: &str) -> Option<String> {
        match kind {
            EncodingKind::Percent => layers::percent(input),
            EncodingKind::HtmlEntity => layers::html_entities(input, self.config.html),
            EncodingKind::UnicodeEscape => layers::unicode_escapes(input),
            EncodingKind::HexEscape => layers::hex_escapes(input),
            EncodingKind::Base64 => layers::base64(input, self.config.base64),
            EncodingKind::RawHex => layers::raw_hex(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_fixed_point() {
        let decoded = Decoder::new(DecoderConfig::shield()).decode("hello world");
        assert_eq!(decoded.text, "hello world");
        assert!(decoded.trace.is_empty());
    }

    #[test]
    fn test_double_percent_takes_two_passes() {
        let decoded = Decoder::new(DecoderConfig::url()).decode("%253Cscript%253E");
        assert_eq!(decoded.text, "<script>");
        assert_eq!(
            decoded.trace.kinds(),
            vec![EncodingKind::Percent, EncodingKind::Percent]
        );
    }

    #[test]
    fn test_pass_limit_caps_trace() {
        // Four nested percent layers, but only two passes allowed.
        let decoded = Decoder::new(DecoderConfig::url().with_max_passes(2)).decode("%25252541");
        assert_eq!(decoded.trace.len(), 2);
        assert_eq!(decoded.text, "%2541");
    }

    #[test]
    fn test_trace_records_intermediate_outputs() {
        let decoded = Decoder::new(DecoderConfig::shield()).decode("%26lt%3Bb%26gt%3B");
        let layers = decoded.trace.layers();
        assert_eq!(layers[0].kind, EncodingKind::Percent);
        assert_eq!(layers[0].output, "&lt;b&gt;");
        assert_eq!(layers[1].kind, EncodingKind::HtmlEntity);
        assert_eq!(layers[1].output, "<b>");
    }
}
