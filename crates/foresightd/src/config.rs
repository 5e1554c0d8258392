//! Configuration for foresightd.
//!
//! Loads settings from a TOML file, falling back to defaults when the
//! file is absent. Every field carries a serde default so partial
//! configs stay valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default config file path.
pub const CONFIG_PATH: &str = "/etc/foresight/config.toml";

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Per-call timeout. Scenario generation is the longest single call.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_llm_model() -> String {
    "qwen3:8b".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Web search settings (Exa-style semantic search endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// API key sent in the x-api-key header; empty disables the header.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_base_url() -> String {
    "https://api.exa.ai".to_string()
}

fn default_search_timeout() -> u64 {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            api_key: String::new(),
            timeout_secs: default_search_timeout(),
        }
    }
}

/// Full-content document retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Hard cap on downloaded body size before text conversion.
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_max_content_bytes() -> usize {
    512 * 1024
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_content_bytes: default_max_content_bytes(),
        }
    }
}

/// Storage paths for the event store and prediction cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_events_db")]
    pub events_db: String,

    #[serde(default = "default_cache_db")]
    pub cache_db: String,
}

fn default_events_db() -> String {
    "/var/lib/foresight/events.db".to_string()
}

fn default_cache_db() -> String {
    "/var/lib/foresight/predictions.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            events_db: default_events_db(),
            cache_db: default_cache_db(),
        }
    }
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForesightConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ForesightConfig {
    /// Load from the given path, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ForesightConfig::default();
        assert_eq!(config.llm.base_url, "http://127.0.0.1:11434");
        assert_eq!(config.llm.timeout_secs, 120);
        assert!(config.search.api_key.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ForesightConfig = toml::from_str(
            r#"
            [llm]
            model = "llama3.1:8b"
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "llama3.1:8b");
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.fetch.max_content_bytes, 512 * 1024);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ForesightConfig::load(Path::new("/nonexistent/foresight.toml")).unwrap();
        assert_eq!(config.storage.cache_db, "/var/lib/foresight/predictions.db");
    }
}
