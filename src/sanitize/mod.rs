pub mod sqli;
pub mod xss;

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::verdict::Category;

/// Upper bound on how often one layer is re-applied to its own output.
pub const MAX_CLEAN_ROUNDS: usize = 4;

static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace regex"));

/// A single sanitization layer.
pub trait Sanitizer: Send + Sync {
    /// Remove this layer's payloads from `input`, keeping the surrounding text.
    fn sanitize(&self, input: &str) -> String;

    /// Category of payload this layer removes.
    fn category(&self) -> Category;

    /// Name of this sanitizer layer (for logging/debugging).
    fn name(&self) -> &str;
}

/// Layers run in sequence, each on the previous layer's output.
pub struct SanitizePipeline {
    layers: Vec<Box<dyn Sanitizer>>,
}

impl SanitizePipeline {
    /// Layers for the given categories in their fixed order: XSS, then SQL.
    pub fn for_categories(categories: &BTreeSet<Category>) -> Self {
        let mut layers: Vec<Box<dyn Sanitizer>> = Vec::new();
        if categories.contains(&Category::Xss) {
            layers.push(Box::new(xss::XssSanitizer));
        }
        if categories.contains(&Category::Sqli) {
            layers.push(Box::new(sqli::SqlSanitizer));
        }
        Self { layers }
    }

    /// Layers in the order they run.
    pub fn layers(&self) -> impl Iterator<Item = &dyn Sanitizer> {
        self.layers.iter().map(|l| l.as_ref())
    }

    /// Run all sanitization layers in sequence.
    pub fn sanitize(&self, input: &str) -> String {
        let mut result = input.to_string();
        for layer in &self.layers {
            result = layer.sanitize(&result);
        }
        result
    }
}

/// Remove the payloads of `categories` from `text`. An empty set returns the
/// text unchanged.
pub fn sanitize(text: &str, categories: &BTreeSet<Category>) -> String {
    SanitizePipeline::for_categories(categories).sanitize(text)
}

/// Apply `step` until the text stops changing, at most [`MAX_CLEAN_ROUNDS`] times.
pub(crate) fn until_stable(input: &str, step: impl Fn(&str) -> String) -> String {
    let mut current = input.to_string();
    for _ in 0..MAX_CLEAN_ROUNDS {
        let next = step(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Collapse whitespace runs to one space and trim the ends.
pub(crate) fn tidy(input: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(input, " ").trim().to_string()
}
