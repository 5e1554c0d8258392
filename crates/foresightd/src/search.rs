//! Web search client for supporting-evidence and historical-pattern
//! queries.
//!
//! Backed by an Exa-style semantic search endpoint. Zero results is a
//! normal outcome, never an error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::SearchConfig;

/// Search depth hint forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

/// Knobs for one search call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_results: usize,
    /// Results scoring below this are discarded client-side as well.
    pub min_score: f64,
    pub depth: SearchDepth,
}

/// One search result candidate, before evidence extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    /// Relevance score in [0, 1] from the search backend.
    #[serde(default)]
    pub score: f64,
}

/// Web search interface consumed by the evidence collector.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// May return fewer results than requested. Must not fail on zero results.
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<ArticleHit>>;
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    search_type: SearchDepth,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ArticleHit>,
}

/// HTTP client for an Exa-style `/search` endpoint.
pub struct ExaSearchClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ExaSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .context("Failed to build search http client")?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl WebSearch for ExaSearchClient {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<ArticleHit>> {
        let url = format!("{}/search", self.base_url);

        let request = SearchRequest {
            query,
            num_results: options.max_results,
            search_type: options.depth,
        };

        let mut builder = self.http_client.post(&url).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.header("x-api-key", &self.api_key);
        }

        let response = builder.send().await.context("Search request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Search backend returned {}", response.status());
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to parse search response")?;

        let hits: Vec<ArticleHit> = parsed
            .results
            .into_iter()
            .filter(|hit| hit.score >= options.min_score)
            .take(options.max_results)
            .collect();

        debug!("Search '{}' returned {} hits", query, hits.len());
        Ok(hits)
    }
}
