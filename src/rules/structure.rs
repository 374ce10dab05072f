use std::sync::LazyLock;

use regex::Regex;
use url::{form_urlencoded, Host, Url};

use crate::verdict::{Category, RuleHit};

/// URLs longer than this are flagged.
pub const LONG_URL_CHARS: usize = 200;

static ABUSE_TLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:zip|mov|gq|tk|ml|cf|ga|top|xyz|click)$").expect("abuse tld regex")
});

static EXECUTABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:exe|scr|bat|cmd|js|jar|vbs|ps1|apk|msi|hta)$").expect("executable regex")
});

static OPEN_REDIRECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[?&](?:url|dest|redirect|next|to)=https?:").expect("open redirect regex")
});

/// A structural red flag found in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSignal {
    /// The string could not be parsed as a URL at all.
    Invalid,
    PlainHttp,
    NonWebScheme(String),
    Userinfo,
    IpHost,
    Punycode,
    AbuseTld,
    Executable,
    OpenRedirect,
    LongUrl,
}

impl UrlSignal {
    pub fn weight(&self) -> u32 {
        match self {
            UrlSignal::PlainHttp | UrlSignal::OpenRedirect | UrlSignal::LongUrl => 2,
            UrlSignal::IpHost | UrlSignal::Punycode | UrlSignal::AbuseTld => 3,
            UrlSignal::Invalid
            | UrlSignal::NonWebScheme(_)
            | UrlSignal::Userinfo
            | UrlSignal::Executable => 8,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            UrlSignal::Invalid
                | UrlSignal::NonWebScheme(_)
                | UrlSignal::Userinfo
                | UrlSignal::Executable
        )
    }

    /// Stable rule name, used for `RuleHit`s.
    pub fn rule(&self) -> &'static str {
        match self {
            UrlSignal::Invalid => "invalid-url",
            UrlSignal::PlainHttp => "plain-http",
            UrlSignal::NonWebScheme(_) => "non-web-scheme",
            UrlSignal::Userinfo => "userinfo",
            UrlSignal::IpHost => "ip-hostname",
            UrlSignal::Punycode => "punycode",
            UrlSignal::AbuseTld => "abuse-tld",
            UrlSignal::Executable => "direct-executable",
            UrlSignal::OpenRedirect => "open-redirect",
            UrlSignal::LongUrl => "long-url",
        }
    }

    /// Human-readable reason shown in reports.
    pub fn reason(&self) -> String {
        match self {
            UrlSignal::Invalid => "Invalid URL".into(),
            UrlSignal::PlainHttp => "Uses HTTP".into(),
            UrlSignal::NonWebScheme(scheme) => format!("Non-web scheme: {scheme}:"),
            UrlSignal::Userinfo => "Has userinfo (@) before host".into(),
            UrlSignal::IpHost => "Raw IP as hostname".into(),
            UrlSignal::Punycode => "Punycode (IDN) domain".into(),
            UrlSignal::AbuseTld => "High-abuse TLD".into(),
            UrlSignal::Executable => "Direct executable link".into(),
            UrlSignal::OpenRedirect => "Open-redirect parameter".into(),
            UrlSignal::LongUrl => "Very long URL".into(),
        }
    }
}

/// Everything the structural checks learned about one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlInspection {
    pub signals: Vec<UrlSignal>,
    pub hostname: Option<String>,
}

impl UrlInspection {
    pub fn has(&self, signal: &UrlSignal) -> bool {
        self.signals.contains(signal)
    }

    /// The signals as URL-structure rule hits.
    pub fn hits(&self) -> Vec<RuleHit> {
        self.signals
            .iter()
            .map(|s| RuleHit::new(Category::UrlStructure, s.rule()))
            .collect()
    }
}

/// Run every URL-structure check against `raw`.
pub fn inspect(raw: &str) -> UrlInspection {
    let url = match Url::parse(raw.trim()) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(error = %e, "url did not parse");
            return UrlInspection {
                signals: vec![UrlSignal::Invalid],
                hostname: None,
            };
        }
    };

    let mut signals = Vec::new();
    let host = url.host_str().unwrap_or_default().to_string();

    match url.scheme() {
        "http" => signals.push(UrlSignal::PlainHttp),
        "https" => {}
        other => signals.push(UrlSignal::NonWebScheme(other.to_string())),
    }
    if !url.username().is_empty() || url.password().is_some() {
        signals.push(UrlSignal::Userinfo);
    }
    if matches!(url.host(), Some(Host::Ipv4(_))) {
        signals.push(UrlSignal::IpHost);
    }
    if host.split('.').any(|label| label.starts_with("xn--")) {
        signals.push(UrlSignal::Punycode);
    }
    if ABUSE_TLD_RE.is_match(&host) {
        signals.push(UrlSignal::AbuseTld);
    }
    if links_executable(&url) {
        signals.push(UrlSignal::Executable);
    }
    if let Some(query) = url.query() {
        if OPEN_REDIRECT_RE.is_match(&format!("?{query}")) {
            signals.push(UrlSignal::OpenRedirect);
        }
    }
    if url.as_str().chars().count() > LONG_URL_CHARS {
        signals.push(UrlSignal::LongUrl);
    }

    UrlInspection {
        signals,
        hostname: (!host.is_empty()).then_some(host),
    }
}

/// True if the path, or the path of an absolute URL carried in a query or
/// fragment value, ends in an executable extension.
fn links_executable(url: &Url) -> bool {
    if EXECUTABLE_RE.is_match(url.path()) {
        return true;
    }
    let fragment = form_urlencoded::parse(url.fragment().unwrap_or_default().as_bytes());
    url.query_pairs().chain(fragment).any(|(_, value)| {
        let lower = value.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return false;
        }
        Url::parse(&value)
            .map(|nested| EXECUTABLE_RE.is_match(nested.path()))
            .unwrap_or(false)
    })
}
