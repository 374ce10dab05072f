use serde::{Deserialize, Serialize};

/// Detection category a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "xss")]
    Xss,
    #[serde(rename = "sqli")]
    Sqli,
    #[serde(rename = "url-structure")]
    UrlStructure,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Xss => "xss",
            Category::Sqli => "sqli",
            Category::UrlStructure => "url-structure",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xss" => Ok(Category::Xss),
            "sqli" => Ok(Category::Sqli),
            "url-structure" | "url" => Ok(Category::UrlStructure),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

/// A confirmed match of one rule against a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleHit {
    pub category: Category,

    /// Stable rule name, e.g. `script-block` or `union-select`.
    pub rule: String,
}

impl RuleHit {
    pub fn new(category: Category, rule: impl Into<String>) -> Self {
        Self {
            category,
            rule: rule.into(),
        }
    }
}

/// The three-tier classification shown to the user, ordered from least to
/// most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Caution,
    Unsafe,
}

impl Verdict {
    /// Score at or above which the verdict is Unsafe.
    pub const UNSAFE_THRESHOLD: u32 = 8;
    /// Score at or above which the verdict is at least Caution.
    pub const CAUTION_THRESHOLD: u32 = 4;

    /// Map a score to a verdict. A fatal signal always wins.
    pub fn from_score(score: u32, fatal: bool) -> Self {
        if fatal || score >= Self::UNSAFE_THRESHOLD {
            Verdict::Unsafe
        } else if score >= Self::CAUTION_THRESHOLD {
            Verdict::Caution
        } else {
            Verdict::Safe
        }
    }

    /// One-line recommendation shown next to the verdict.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Verdict::Safe => "No blocking indicators found.",
            Verdict::Caution => "Be careful; review the indicators below before proceeding.",
            Verdict::Unsafe => "Do not open this link.",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Safe => write!(f, "Safe"),
            Verdict::Caution => write!(f, "Caution"),
            Verdict::Unsafe => write!(f, "Unsafe"),
        }
    }
}

/// Accumulated risk: a monotone sum of signal weights plus a sticky fatal flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: u32,
    pub fatal: bool,
}

impl RiskScore {
    pub fn new(score: u32, fatal: bool) -> Self {
        Self { score, fatal }
    }

    /// Add one weighted signal.
    pub fn add(&mut self, weight: u32, fatal: bool) {
        self.score = self.score.saturating_add(weight);
        self.fatal |= fatal;
    }

    /// Fold another score into this one. Order does not matter.
    pub fn merge(&mut self, other: RiskScore) {
        self.add(other.score, other.fatal);
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_score(self.score, self.fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::from_score(0, false), Verdict::Safe);
        assert_eq!(Verdict::from_score(3, false), Verdict::Safe);
        assert_eq!(Verdict::from_score(4, false), Verdict::Caution);
        assert_eq!(Verdict::from_score(7, false), Verdict::Caution);
        assert_eq!(Verdict::from_score(8, false), Verdict::Unsafe);
    }

    #[test]
    fn test_verdicts_order_by_severity() {
        assert!(Verdict::Safe < Verdict::Caution);
        assert!(Verdict::Caution < Verdict::Unsafe);
        assert_eq!(
            [Verdict::Caution, Verdict::Unsafe, Verdict::Safe].iter().max(),
            Some(&Verdict::Unsafe)
        );
    }

    #[test]
    fn test_fatal_overrides_score() {
        assert_eq!(Verdict::from_score(0, true), Verdict::Unsafe);
    }

    #[test]
    fn test_merge_is_commutative() {
        let mut a = RiskScore::new(2, false);
        a.merge(RiskScore::new(3, true));
        let mut b = RiskScore::new(3, true);
        b.merge(RiskScore::new(2, false));
        assert_eq!(a, b);
        assert_eq!(a.verdict(), Verdict::Unsafe);
    }

    #[test]
    fn test_category_roundtrip_names() {
        assert_eq!("xss".parse::<Category>().unwrap(), Category::Xss);
        assert_eq!(Category::UrlStructure.to_string(), "url-structure");
        assert!("shellcode".parse::<Category>().is_err());
    }
}
