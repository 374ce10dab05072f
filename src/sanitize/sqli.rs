use std::sync::LazyLock;

use regex::Regex;

use crate::verdict::Category;

use super::{tidy, until_stable, Sanitizer};

static DML_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:delete|update)\b\s+\w+\s+(?:from|set)\b").expect("dml regex")
});

static UNION_SELECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bunion\s+select\b").expect("union regex"));

static WHERE_CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bwhere\b.{0,60}").expect("where regex"));

static TAUTOLOGY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:or|and)\b\s+['"`]?\w+['"`]?\s*=\s*['"`]?\w+['"`]?"#)
        .expect("tautology regex")
});

static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:--|#)[^\n]*(?:\r?\n|$)").expect("line comment regex"));

static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment regex"));

static STRAY_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"/\*|\*/|['"`;]"#).expect("stray marker regex"));

/// Strips statement fragments, tautologies, comments and quoting characters.
/// Removed spans become a space so that neighbouring words never fuse into
/// a new keyword.
pub struct SqlSanitizer;

impl SqlSanitizer {
    fn strip(input: &str) -> String {
        let text = DML_TARGET_RE.replace_all(input, " ");
        let text = UNION_SELECT_RE.replace_all(&text, " ");
        let text = WHERE_CLAUSE_RE.replace_all(&text, " ");
        let text = TAUTOLOGY_RE.replace_all(&text, " ");
        let text = LINE_COMMENT_RE.replace_all(&text, " ");
        let text = BLOCK_COMMENT_RE.replace_all(&text, " ");
        let text = STRAY_MARKER_RE.replace_all(&text, " ");
        tidy(&text)
    }
}

impl Sanitizer for SqlSanitizer {
    fn sanitize(&self, input: &str) -> String {
        until_stable(input, Self::strip)
    }

    fn category(&self) -> Category {
        Category::Sqli
    }

    fn name(&self) -> &str {
        "sqli"
    }
}
