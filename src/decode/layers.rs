//! Single-layer decoders. Each returns `None` when the layer is absent or
//! fails to decode; the caller treats both the same way.

use std::sync::LazyLock;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use regex::{Captures, Regex};

use super::{Base64Mode, HtmlMode};

/// Minimum run length for a base64 candidate.
pub const BASE64_MIN_LEN: usize = 12;

/// Minimum length for a raw hex candidate.
pub const RAW_HEX_MIN_LEN: usize = 8;

/// Standard alphabet, tolerant of missing padding and stray trailing bits.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

static PERCENT_U_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%u([0-9a-fA-F]{4})").expect("percent-u regex"));

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(\d{1,7});").expect("numeric entity regex"));

static HEX_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&#x([0-9a-f]{1,6});").expect("hex entity regex"));

static UNICODE_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").expect("unicode escape regex"));

static HEX_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\x([0-9a-fA-F]{2})").expect("hex escape regex"));

/// A base64 run sitting where a query value would: after `?`, `&`, `=` or at
/// the start, and ending at the end or before `&`/`#`.
static ANCHORED_BASE64_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[?&=])([A-Za-z0-9+/]{12,}={0,2})(?:$|[&#])").expect("base64 regex")
});

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://").expect("scheme regex"));

static URL_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+$").expect("url text regex")
});

/// `%XX` sequences (UTF-8 aware) plus the legacy `%uXXXX` form.
pub fn percent(input: &str) -> Option<String> {
    if !input.contains('%') {
        return None;
    }
    let widened = PERCENT_U_RE.replace_all(input, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    let decoded = match urlencoding::decode(&widened) {
        Ok(cow) => cow.into_owned(),
        Err(_) => widened.into_owned(),
    };
    changed(input, decoded)
}

/// Numeric character references and named entities.
pub fn html_entities(input: &str, mode: HtmlMode) -> Option<String> {
    if !input.contains('&') {
        return None;
    }
    let decoded = match mode {
        HtmlMode::Full => html_escape::decode_html_entities(input).into_owned(),
        HtmlMode::Basic => {
            let numeric = replace_code_points(&NUMERIC_ENTITY_RE, input, 10);
            let hex = replace_code_points(&HEX_ENTITY_RE, &numeric, 16);
            // `&amp;` last, so `&amp;lt;` stays a second layer.
            hex.replace("&lt;", "<")
                .replace("&gt;", ">")
                .replace("&quot;", "\"")
                .replace("&apos;", "'")
                .replace("&amp;", "&")
        }
    };
    changed(input, decoded)
}

/// JavaScript-style `\uXXXX` escapes.
pub fn unicode_escapes(input: &str) -> Option<String> {
    if !input.contains("\\u") {
        return None;
    }
    changed(input, replace_code_points(&UNICODE_ESCAPE_RE, input, 16))
}

/// `\xXX` escapes.
pub fn hex_escapes(input: &str) -> Option<String> {
    if !input.contains("\\x") {
        return None;
    }
    changed(input, replace_code_points(&HEX_ESCAPE_RE, input, 16))
}

/// Base64 payloads; see [`Base64Mode`] for where candidates are looked for.
pub fn base64(input: &str, mode: Base64Mode) -> Option<String> {
    match mode {
        Base64Mode::Anchored => {
            for caps in ANCHORED_BASE64_RE.captures_iter(input) {
                let Some(candidate) = caps.get(1) else {
                    continue;
                };
                let Some(text) = decode_base64_text(candidate.as_str()) else {
                    continue;
                };
                if !looks_like_url_text(&text) {
                    continue;
                }
                let mut result = input.to_string();
                result.replace_range(candidate.range(), &text);
                return changed(input, result);
            }
            None
        }
        Base64Mode::Whole => {
            let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
            if stripped.len() < BASE64_MIN_LEN
                || stripped.len() % 4 != 0
                || !stripped.bytes().all(is_base64_char)
            {
                return None;
            }
            let text = decode_base64_text(&stripped)?;
            changed(input, text)
        }
    }
}

/// A whole-string run of hex digit pairs, read as one byte per character.
pub fn raw_hex(input: &str) -> Option<String> {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.len() < RAW_HEX_MIN_LEN
        || stripped.len() % 2 != 0
        || !stripped.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    let bytes = stripped.as_bytes();
    let mut out = String::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks(2) {
        let byte = (hex_val(pair[0])? << 4) | hex_val(pair[1])?;
        if !(byte.is_ascii_graphic() || byte.is_ascii_whitespace()) {
            return None;
        }
        out.push(byte as char);
    }
    changed(input, out)
}

/// Decode a base64 candidate into printable UTF-8 text.
fn decode_base64_text(candidate: &str) -> Option<String> {
    let bytes = LENIENT_BASE64.decode(candidate).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    if text.is_empty() || text.chars().any(|c| c.is_control() && !c.is_whitespace()) {
        return None;
    }
    Some(text)
}

/// Plausibility policy for base64 found inside a URL: either it carries a
/// scheme, or it is made only of characters a URL may contain.
pub fn looks_like_url_text(text: &str) -> bool {
    SCHEME_RE.is_match(text) || URL_TEXT_RE.is_match(text)
}

fn replace_code_points(re: &Regex, input: &str, radix: u32) -> String {
    re.replace_all(input, |caps: &Captures| {
        u32::from_str_radix(&caps[1], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

fn changed(input: &str, output: String) -> Option<String> {
    (output != input).then_some(output)
}

fn is_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'='
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
