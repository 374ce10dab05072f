pub mod prose;
pub mod text;
pub mod structure;

use std::collections::BTreeSet;

use crate::error::Result;
use crate::verdict::{Category, RuleHit};

pub use self::prose::is_plain_english;
pub use self::text::{confirms_sql, TextRule, TextRuleSet};
pub use self::structure::{inspect, UrlInspection, UrlSignal};

/// Fixed rule sets for XSS, SQL injection and URL structure, with a
/// per-call-site choice of which categories run.
pub struct RuleEngine {
    categories: BTreeSet<Category>,
    prose_filter: bool,
    xss: TextRuleSet,
    sqli: TextRuleSet,
}

impl RuleEngine {
    /// Build an engine with the built-in rules.
    pub fn new(categories: impl IntoIterator<Item = Category>, prose_filter: bool) -> Self {
        let xss = TextRuleSet::new(Category::Xss, TextRuleSet::default_xss_rules())
            .expect("default xss rules should compile");
        let sqli = TextRuleSet::new(Category::Sqli, TextRuleSet::default_sqli_rules())
            .expect("default sqli rules should compile");
        Self {
            categories: categories.into_iter().collect(),
            prose_filter,
            xss,
            sqli,
        }
    }

    /// Build an engine from custom rule lists.
    pub fn with_rules(
        categories: impl IntoIterator<Item = Category>,
        prose_filter: bool,
        xss_rules: Vec<TextRule>,
        sqli_rules: Vec<TextRule>,
    ) -> Result<Self> {
        Ok(Self {
            categories: categories.into_iter().collect(),
            prose_filter,
            xss: TextRuleSet::new(Category::Xss, xss_rules)?,
            sqli: TextRuleSet::new(Category::Sqli, sqli_rules)?,
        })
    }

    /// Engine used by the input shield: text rules plus the prose short-circuit.
    pub fn shield() -> Self {
        Self::new([Category::Xss, Category::Sqli], true)
    }

    /// Engine used when scoring links: URL-structure rules only.
    pub fn url() -> Self {
        Self::new([Category::UrlStructure], false)
    }

    pub fn enabled(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// XSS signatures matching `text`.
    pub fn xss_hits(&self, text: &str) -> Vec<RuleHit> {
        if !self.enabled(Category::Xss) {
            return Vec::new();
        }
        self.xss.matches(text)
    }

    /// SQL signatures matching `text`, dropped unless the confirmation gate agrees.
    pub fn sqli_hits(&self, text: &str) -> Vec<RuleHit> {
        if !self.enabled(Category::Sqli) {
            return Vec::new();
        }
        let hits = self.sqli.matches(text);
        if hits.is_empty() || !confirms_sql(text) {
            return Vec::new();
        }
        hits
    }

    /// URL-structure signals for `text`, expressed as rule hits.
    pub fn url_hits(&self, text: &str) -> Vec<RuleHit> {
        if !self.enabled(Category::UrlStructure) {
            return Vec::new();
        }
        inspect(text).hits()
    }

    /// Hits of a single category, empty when that category is disabled.
    pub fn hits_for(&self, category: Category, text: &str) -> Vec<RuleHit> {
        match category {
            Category::Xss => self.xss_hits(text),
            Category::Sqli => self.sqli_hits(text),
            Category::UrlStructure => self.url_hits(text),
        }
    }

    /// All enabled rules against one string.
    pub fn classify(&self, text: &str) -> BTreeSet<RuleHit> {
        let mut hits = BTreeSet::new();
        hits.extend(self.xss_hits(text));
        hits.extend(self.sqli_hits(text));
        hits.extend(self.url_hits(text));
        hits
    }

    /// True when both forms read as ordinary prose and classification can be skipped.
    pub fn is_prose(&self, original: &str, decoded: &str) -> bool {
        self.prose_filter && is_plain_english(original) && is_plain_english(decoded)
    }

    /// Classify the original and the decoded form and union the results.
    pub fn classify_pair(&self, original: &str, decoded: &str) -> BTreeSet<RuleHit> {
        if self.is_prose(original, decoded) {
            return BTreeSet::new();
        }
        let mut hits = self.classify(original);
        if decoded != original {
            hits.extend(self.classify(decoded));
        }
        hits
    }
}

/// Distinct categories present in a hit set.
pub fn categories_of<'a>(hits: impl IntoIterator<Item = &'a RuleHit>) -> BTreeSet<Category> {
    hits.into_iter().map(|h| h.category).collect()
}
