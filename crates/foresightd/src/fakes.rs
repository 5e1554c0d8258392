//! Fake collaborators for deterministic testing.
//!
//! No network, no shell, no model. Each fake replays scripted
//! responses in order and counts calls, so orchestration flows can be
//! verified exactly.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use foresight_common::{EventData, EventPrediction};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::cache::PredictionCacheStore;
use crate::event_store::EventStore;
use crate::fetch::DocumentFetcher;
use crate::llm::LanguageModel;
use crate::search::{ArticleHit, SearchOptions, WebSearch};

// ============================================================================
// Language model
// ============================================================================

/// Scripted language model. Responses are consumed in order; when the
/// script runs dry the last response is repeated.
pub struct FakeLanguageModel {
    responses: Mutex<Vec<String>>,
    fail: bool,
    calls: AtomicU32,
}

impl FakeLanguageModel {
    pub fn completing(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            fail: false,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(vec![]),
            fail: true,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for FakeLanguageModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("fake model unavailable"));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            Ok(responses.remove(0))
        } else {
            responses
                .first()
                .cloned()
                .ok_or_else(|| anyhow!("fake model script exhausted"))
        }
    }
}

// ============================================================================
// Web search
// ============================================================================

/// Scripted web search. Each call pops the next scripted result list;
/// an exhausted script returns zero hits, which is a legal outcome.
pub struct FakeWebSearch {
    results: Mutex<Vec<Vec<ArticleHit>>>,
    fail: bool,
    calls: AtomicU32,
}

impl FakeWebSearch {
    pub fn new(results: Vec<Vec<ArticleHit>>) -> Self {
        Self {
            results: Mutex::new(results),
            fail: false,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: Mutex::new(vec![]),
            fail: true,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearch for FakeWebSearch {
    async fn search(&self, _query: &str, _options: &SearchOptions) -> Result<Vec<ArticleHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("fake search backend down"));
        }
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(vec![])
        } else {
            Ok(results.remove(0))
        }
    }
}

// ============================================================================
// Document fetcher
// ============================================================================

/// Fetcher returning the same content for every url, or scripted
/// per-url outcomes.
pub struct FakeDocumentFetcher {
    default_content: Option<String>,
    per_url: HashMap<String, Option<String>>,
    calls: AtomicU32,
}

impl FakeDocumentFetcher {
    /// Every fetch succeeds with this content.
    pub fn always(content: &str) -> Self {
        Self {
            default_content: Some(content.to_string()),
            per_url: HashMap::new(),
            calls: AtomicU32::new(0),
        }
    }

    /// Every fetch returns None (paywall/timeout behavior).
    pub fn unavailable() -> Self {
        Self {
            default_content: None,
            per_url: HashMap::new(),
            calls: AtomicU32::new(0),
        }
    }

    /// Override the outcome for one url.
    pub fn with_url(mut self, url: &str, content: Option<&str>) -> Self {
        self.per_url
            .insert(url.to_string(), content.map(|c| c.to_string()));
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for FakeDocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(outcome) = self.per_url.get(url) {
            return Ok(outcome.clone());
        }
        Ok(self.default_content.clone())
    }
}

// ============================================================================
// Event store
// ============================================================================

/// In-memory event store seeded at construction.
#[derive(Default)]
pub struct FakeEventStore {
    events: HashMap<String, EventData>,
}

impl FakeEventStore {
    pub fn with_events(events: Vec<EventData>) -> Self {
        Self {
            events: events
                .into_iter()
                .map(|e| (e.event_id.clone(), e))
                .collect(),
        }
    }
}

#[async_trait]
impl EventStore for FakeEventStore {
    async fn get_event(&self, event_id: &str) -> Result<Option<EventData>> {
        Ok(self.events.get(event_id).cloned())
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Cache whose writes always fail. Reads behave as an empty cache.
pub struct FailingCache;

#[async_trait]
impl PredictionCacheStore for FailingCache {
    async fn get(&self, _event_id: &str) -> Result<Option<EventPrediction>> {
        Ok(None)
    }

    async fn put(&self, _prediction: &EventPrediction) -> Result<()> {
        Err(anyhow!("fake cache write failure"))
    }
}
