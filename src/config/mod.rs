use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::decode::DecoderConfig;
use crate::error::{Result, ShieldError};

/// Returns the global config directory path: `~/.config/inputshield/`
pub fn dirs_global() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("inputshield")
}

/// Top-level configuration, read from `~/.config/inputshield/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldConfig {
    /// Initial state of the input shield. Default: true.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Enrichment backend.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Pass limits for the two decoder presets.
    #[serde(default)]
    pub decoder: DecoderLimits,

    /// Stats file. Default: `~/.config/inputshield/stats.json`.
    #[serde(default)]
    pub stats_path: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: BackendConfig::default(),
            decoder: DecoderLimits::default(),
            stats_path: None,
        }
    }
}

impl ShieldConfig {
    /// Load config from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| ShieldError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the global config from `~/.config/inputshield/config.yml`.
    pub fn load() -> Result<Self> {
        Self::load_from(&dirs_global().join("config.yml"))
    }

    pub fn stats_path(&self) -> PathBuf {
        self.stats_path
            .clone()
            .unwrap_or_else(|| dirs_global().join("stats.json"))
    }

    pub fn url_decoder(&self) -> DecoderConfig {
        DecoderConfig::url().with_max_passes(self.decoder.url_max_passes)
    }

    pub fn shield_decoder(&self) -> DecoderConfig {
        DecoderConfig::shield().with_max_passes(self.decoder.shield_max_passes)
    }
}

/// Where and how to reach the enrichment backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URLs probed in order; the first one answering `/ping` is used.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Whole-request timeout for enrichment. Default: 5.
    #[serde(default = "default_enrichment_timeout")]
    pub enrichment_timeout_secs: u64,

    /// Per-candidate ping timeout. Default: 800.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
}

fn default_candidates() -> Vec<String> {
    vec![
        "http://127.0.0.1:8080".into(),
        "http://localhost:8080".into(),
    ]
}
fn default_enrichment_timeout() -> u64 {
    5
}
fn default_probe_timeout() -> u64 {
    800
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            enrichment_timeout_secs: 5,
            probe_timeout_ms: 800,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderLimits {
    #[serde(default = "default_url_passes")]
    pub url_max_passes: usize,
    #[serde(default = "default_shield_passes")]
    pub shield_max_passes: usize,
}

fn default_url_passes() -> usize {
    3
}
fn default_shield_passes() -> usize {
    10
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            url_max_passes: 3,
            shield_max_passes: 10,
        }
    }
}
