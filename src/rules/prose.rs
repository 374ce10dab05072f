use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use regex::Regex;

static PROSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[a-zA-Z0-9\s.,!?'"()\-]{4,}$"#).expect("prose regex"));

static NON_PROSE_MARKERS: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::new(["<", ">", "{", "}", "$", ";", "=", "`", "--", "/*"])
        .expect("valid aho-corasick patterns")
});

/// Conservative "ordinary sentence" test: letters, digits, whitespace and a
/// little punctuation, at least 4 characters, and none of the markers that
/// markup or SQL need.
pub fn is_plain_english(text: &str) -> bool {
    PROSE_RE.is_match(text) && !NON_PROSE_MARKERS.is_match(text)
}
