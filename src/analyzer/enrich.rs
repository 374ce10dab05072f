use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::BackendConfig;
use crate::error::{Result, ShieldError};

/// Path of the analysis endpoint, relative to the backend base URL.
pub const ANALYZE_PATH: &str = "/api/analyzer/v1/analyze";
/// Path probed to decide whether a candidate backend is alive.
pub const PING_PATH: &str = "/ping";

/// One hop of the redirect chain the backend followed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectHop {
    pub status: Option<u16>,
    pub url: String,
    pub host: Option<String>,
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsSnapshot {
    pub host: Option<String>,
    pub a: Vec<String>,
    pub aaaa: Vec<String>,
    pub ns: Vec<String>,
    pub dnssec: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoisRecord {
    pub domain: Option<String>,
    pub created: Option<String>,
    pub registrar: Option<String>,
    pub rdap_provider: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsInfo {
    pub host: Option<String>,
    pub issuer: Option<String>,
    pub valid_to: Option<String>,
    pub hostname_match: Option<bool>,
    pub protocol: Option<String>,
}

/// The `data` object of a successful backend response. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnrichmentData {
    pub score: u32,
    pub fatal: bool,
    pub reasons: Vec<String>,
    pub final_url: Option<String>,
    pub hostname: Option<String>,
    pub chain: Option<Vec<RedirectHop>>,
    pub dns: Option<DnsSnapshot>,
    pub whois: Option<WhoisRecord>,
    pub tls: Option<TlsInfo>,
}

/// Backend response envelope: `{ok: true, data}` or `{ok: false, error}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub data: Option<EnrichmentData>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn into_result(self) -> Result<EnrichmentData> {
        if self.ok {
            Ok(self.data.unwrap_or_default())
        } else {
            Err(ShieldError::BackendRejected {
                reason: self.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    url: &'a str,
}

/// Source of remote context for a URL.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, url: &str) -> Result<EnrichmentData>;
}

/// Picks the backend base URL once per process.
pub struct EndpointResolver {
    client: reqwest::Client,
    candidates: Vec<String>,
    probe_timeout: Duration,
    resolved: OnceCell<String>,
}

impl EndpointResolver {
    pub fn new(client: reqwest::Client, candidates: Vec<String>, probe_timeout: Duration) -> Self {
        Self {
            client,
            candidates: candidates
                .into_iter()
                .map(|c| c.trim_end_matches('/').to_string())
                .collect(),
            probe_timeout,
            resolved: OnceCell::new(),
        }
    }

    /// A resolver that never probes.
    pub fn fixed(client: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            client,
            candidates: vec![base.clone()],
            probe_timeout: Duration::ZERO,
            resolved: OnceCell::new_with(Some(base)),
        }
    }

    /// The first candidate whose `/ping` answers 2xx, else the first candidate.
    pub async fn resolve(&self) -> Result<&str> {
        if let Some(base) = self.resolved.get() {
            return Ok(base.as_str());
        }
        if self.candidates.is_empty() {
            return Err(ShieldError::Enrichment {
                reason: "no backend candidates configured".to_string(),
            });
        }
        let base = self.resolved.get_or_init(|| self.probe()).await;
        Ok(base.as_str())
    }

    async fn probe(&self) -> String {
        for candidate in &self.candidates {
            let ping = format!("{}{}", candidate, PING_PATH);
            match self
                .client
                .get(&ping)
                .timeout(self.probe_timeout)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    tracing::info!(backend = %candidate, "selected enrichment backend");
                    return candidate.clone();
                }
                Ok(resp) => {
                    tracing::debug!(backend = %candidate, status = %resp.status(), "ping rejected");
                }
                Err(e) => {
                    tracing::debug!(backend = %candidate, error = %e, "ping failed");
                }
            }
        }
        // Non-empty: checked by `resolve`.
        let fallback = self.candidates[0].clone();
        tracing::info!(backend = %fallback, "no backend answered ping, using first candidate");
        fallback
    }
}

/// Enrichment over HTTP against the analyzer backend.
pub struct HttpEnricher {
    client: reqwest::Client,
    resolver: EndpointResolver,
    timeout_secs: u64,
}

impl HttpEnricher {
    pub fn new(client: reqwest::Client, resolver: EndpointResolver, timeout_secs: u64) -> Self {
        Self {
            client,
            resolver,
            timeout_secs,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("inputshield/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        let resolver = EndpointResolver::new(
            client.clone(),
            config.candidates.clone(),
            Duration::from_millis(config.probe_timeout_ms),
        );
        Self::new(client, resolver, config.enrichment_timeout_secs)
    }

    async fn post(&self, url: &str) -> Result<EnrichmentData> {
        let base = self.resolver.resolve().await?;
        let endpoint = format!("{}{}", base, ANALYZE_PATH);

        let resp = self
            .client
            .post(&endpoint)
            .json(&AnalyzeRequest { url })
            .send()
            .await
            .map_err(|e| ShieldError::Enrichment {
                reason: format!("request to {} failed: {}", endpoint, e),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ShieldError::Enrichment {
            reason: format!("reading response failed: {}", e),
        })?;

        // An `{ok: false}` envelope is meaningful whatever the status code.
        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(envelope) => envelope.into_result(),
            Err(_) if !status.is_success() => Err(ShieldError::Api {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(ShieldError::Enrichment {
                reason: format!("invalid response JSON: {}", e),
            }),
        }
    }
}

#[async_trait]
impl Enricher for HttpEnricher {
    async fn enrich(&self, url: &str) -> Result<EnrichmentData> {
        let timeout = Duration::from_secs(self.timeout_secs);
        match tokio::time::timeout(timeout, self.post(url)).await {
            Ok(result) => result,
            Err(_) => Err(ShieldError::EnrichmentTimeout {
                timeout_secs: self.timeout_secs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_ok_with_partial_data() {
        let resp: ApiResponse = serde_json::from_str(
            r#"{"ok":true,"data":{"score":3,"finalUrl":"https://a.example/","dns":null}}"#,
        )
        .unwrap();
        let data = resp.into_result().unwrap();
        assert_eq!(data.score, 3);
        assert!(!data.fatal);
        assert_eq!(data.final_url.as_deref(), Some("https://a.example/"));
        assert!(data.dns.is_none());
        assert!(data.chain.is_none());
    }

    #[test]
    fn test_envelope_error() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"ok":false,"error":"lookup failed"}"#).unwrap();
        match resp.into_result() {
            Err(ShieldError::BackendRejected { reason }) => assert_eq!(reason, "lookup failed"),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_enrichment_fields_use_backend_names() {
        let data: EnrichmentData = serde_json::from_str(
            r#"{
                "chain": [{"status": 301, "url": "http://a/", "host": "a", "scheme": "http"}],
                "whois": {"domain": "a", "rdap_provider": "rdap.example"},
                "tls": {"issuer": "CA", "hostname_match": true}
            }"#,
        )
        .unwrap();
        let chain = data.chain.unwrap();
        assert_eq!(chain[0].status, Some(301));
        assert_eq!(data.whois.unwrap().rdap_provider.as_deref(), Some("rdap.example"));
        assert_eq!(data.tls.unwrap().hostname_match, Some(true));
    }

    #[tokio::test]
    async fn test_fixed_resolver_skips_probe() {
        let resolver = EndpointResolver::fixed(reqwest::Client::new(), "http://backend.invalid/");
        assert_eq!(resolver.resolve().await.unwrap(), "http://backend.invalid");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_error() {
        let resolver =
            EndpointResolver::new(reqwest::Client::new(), Vec::new(), Duration::from_millis(10));
        assert!(resolver.resolve().await.is_err());
    }
}
