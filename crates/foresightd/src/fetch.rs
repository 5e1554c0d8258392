//! Full-content document retrieval.
//!
//! Expected failure modes (404, paywall, timeout, non-HTML payload)
//! come back as `Ok(None)` so the extractor can fall back to
//! metadata-only evidence. Errors are reserved for programmer mistakes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::FetchConfig;

/// Document retrieval interface consumed by the evidence extractor.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch a url and return readable text, or None when the document
    /// is unavailable.
    async fn fetch(&self, url: &str) -> Result<Option<String>>;
}

/// HTTP fetcher that converts HTML bodies to plain text.
pub struct HttpFetcher {
    http_client: reqwest::Client,
    max_content_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .context("Failed to build fetch http client")?,
            max_content_bytes: config.max_content_bytes,
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Fetch of {} failed: {}", url, e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            debug!("Fetch of {} returned {}", url, response.status());
            return Ok(None);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Reading body of {} failed: {}", url, e);
                return Ok(None);
            }
        };

        let capped = if body.len() > self.max_content_bytes {
            // Truncate on a char boundary.
            let mut end = self.max_content_bytes;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            &body[..end]
        } else {
            &body[..]
        };

        let text = html2text::from_read(capped.as_bytes(), 100);
        if text.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(text))
    }
}
