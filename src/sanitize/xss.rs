use std::sync::LazyLock;

use regex::Regex;

use crate::verdict::Category;

use super::{tidy, until_stable, Sanitizer};

static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?</script\s*>").expect("script block regex"));

static QUOTED_HANDLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\bon\w+\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("quoted handler regex")
});

static BARE_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon\w+\s*=\s*[^\s>]*").expect("bare handler regex"));

static SCRIPT_URI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:javascript|data):[^\s'">]*"#).expect("script uri regex")
});

static ANGLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[<>]").expect("angle regex"));

/// Strips script blocks, inline handlers and script URIs, then any
/// remaining angle brackets, so that visible text survives as plain words.
pub struct XssSanitizer;

impl XssSanitizer {
    fn strip(input: &str) -> String {
        let text = SCRIPT_BLOCK_RE.replace_all(input, "");
        let text = QUOTED_HANDLER_RE.replace_all(&text, "");
        let text = BARE_HANDLER_RE.replace_all(&text, "");
        let text = SCRIPT_URI_RE.replace_all(&text, "");
        let text = ANGLE_RE.replace_all(&text, "");
        tidy(&text)
    }
}

impl Sanitizer for XssSanitizer {
    fn sanitize(&self, input: &str) -> String {
        until_stable(input, Self::strip)
    }

    fn category(&self) -> Category {
        Category::Xss
    }

    fn name(&self) -> &str {
        "xss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_block_removed_text_kept() {
        assert_eq!(XssSanitizer.sanitize("<script>alert(1)</script> hello"), "hello");
    }

    #[test]
    fn test_handlers_removed() {
        let out = XssSanitizer.sanitize(r#"<img src="x.png" onerror="alert(1)"> nice pic"#);
        assert_eq!(out, r#"img src="x.png" nice pic"#);

        let out = XssSanitizer.sanitize("<img src=x onerror=alert(1)>");
        assert_eq!(out, "img src=x");
    }

    #[test]
    fn test_script_uri_removed() {
        let out = XssSanitizer.sanitize(r#"<a href="javascript:alert(1)">click</a>"#);
        assert!(!out.to_lowercase().contains("javascript:"));
        assert!(out.contains("click"));
    }

    #[test]
    fn test_multiline_script() {
        let out = XssSanitizer.sanitize("before <script>\nvar a = 1;\n</script> after");
        assert_eq!(out, "before after");
    }
}
