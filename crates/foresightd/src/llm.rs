//! Language model client.
//!
//! The pipeline calls the model with zero sampling temperature and JSON
//! output mode. Determinism is a requirement: generated probabilities
//! feed a numeric invariant check downstream.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::LlmConfig;

/// Minimal language model interface needed by the pipeline.
///
/// Implementations own temperature=0 and structured JSON output; the
/// pipeline only sees prompt in, text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    options: GenerateOptions,
}

/// Ollama-backed model client.
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .context("Failed to build LLM http client")?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
            options: GenerateOptions { temperature: 0.0 },
        };

        info!(
            "[>]  LLM CALL [{}] prompt {} chars",
            self.model,
            prompt.len()
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned error {}: {}", status, error_text);
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        let text = json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .to_string();

        debug!("[<]  LLM RESPONSE {} chars", text.len());
        Ok(text)
    }
}
