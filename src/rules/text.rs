use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use regex::{Regex, RegexSet};

use crate::error::{Result, ShieldError};
use crate::verdict::{Category, RuleHit};

/// A named pattern belonging to one category.
#[derive(Debug, Clone)]
pub struct TextRule {
    pub name: String,
    pub pattern: String,
}

impl TextRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// All rules of one category compiled into a single `RegexSet`.
pub struct TextRuleSet {
    category: Category,
    names: Vec<String>,
    regex_set: RegexSet,
}

impl TextRuleSet {
    /// Build from named regex patterns.
    pub fn new(category: Category, rules: Vec<TextRule>) -> Result<Self> {
        let regex_set = RegexSet::new(rules.iter().map(|r| r.pattern.as_str())).map_err(|e| {
            ShieldError::InvalidPattern {
                reason: format!("invalid {category} rule: {e}"),
            }
        })?;
        Ok(Self {
            category,
            names: rules.into_iter().map(|r| r.name).collect(),
            regex_set,
        })
    }

    /// Every rule in this set that matches `text`.
    pub fn matches(&self, text: &str) -> Vec<RuleHit> {
        self.regex_set
            .matches(text)
            .into_iter()
            .map(|idx| RuleHit::new(self.category, self.names[idx].clone()))
            .collect()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex_set.is_match(text)
    }

    /// Default cross-site-scripting signatures.
    pub fn default_xss_rules() -> Vec<TextRule> {
        vec![
            TextRule::new("script-block", r"(?is)<script.*?>.*?</script"),
            TextRule::new("event-handler", r"(?i)\bon\w+\s*="),
            TextRule::new("javascript-uri", r"(?i)\bjavascript:"),
        ]
    }

    /// Default SQL-injection signatures. A match still needs corroboration,
    /// see [`confirms_sql`].
    pub fn default_sqli_rules() -> Vec<TextRule> {
        vec![
            TextRule::new(
                "boolean-tautology",
                r#"(?i)\b(?:or|and)\b\s+['"]?\w+['"]?\s*=\s*['"]?\w+"#,
            ),
            TextRule::new("union-select", r"(?i)\bunion\s+select\b"),
            TextRule::new(
                "commented-statement",
                r"(?is)\b(?:select|insert|update|delete|drop)\b.{0,40}(?:--|#|/\*)",
            ),
            TextRule::new(
                "quoted-keyword",
                r#"(?i)['"`]\s*(?:or|and|union|select|delete|update|drop)\b"#,
            ),
        ]
    }
}

/// Characters and markers that corroborate an SQL signature.
static SQL_SYMBOLS: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::new(["'", "\"", "`", "=", "(", ")", ";", "--", "/*"])
        .expect("valid aho-corasick patterns")
});

static STRUCTURED_SQL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:select|delete|update|insert)\b\s+\w+\s+(?:from|set|where)\b|\bselect\b\s+\*")
        .expect("structured sql regex")
});

/// Second stage of SQL detection: the text must contain SQL punctuation or
/// have the shape of a real statement. Keeps sentences like "cats and dogs"
/// from being flagged on keywords alone.
pub fn confirms_sql(text: &str) -> bool {
    SQL_SYMBOLS.is_match(text) || STRUCTURED_SQL_RE.is_match(text)
}
