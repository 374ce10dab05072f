use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ShieldError {
    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("storage error: {reason}")]
    Storage { reason: String },

    #[error("invalid pattern: {reason}")]
    InvalidPattern { reason: String },

    #[error("enrichment error: {reason}")]
    Enrichment { reason: String },

    #[error("backend rejected request: {reason}")]
    BackendRejected { reason: String },

    #[error("enrichment timeout after {timeout_secs}s")]
    EnrichmentTimeout { timeout_secs: u64 },

    #[error("api error: status={status}, body={body}")]
    Api { status: u16, body: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ShieldError>;
