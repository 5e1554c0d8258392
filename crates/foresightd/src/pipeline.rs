//! The prediction orchestrator.
//!
//! One linear pipeline per request: check cache, load event, collect
//! evidence, extract snippets, generate scenarios, normalize, store,
//! return. Every response uses the same envelope; callers branch only
//! on `success`.
//!
//! Two guarantees the stages themselves do not provide live here:
//! at most one concurrent generation per event id (later callers wait,
//! then serve the freshly cached value), and a per-tier wall-clock
//! budget that cancels in-flight sub-calls when exceeded.

use chrono::Utc;
use foresight_common::{
    EventPrediction, PredictionRequest, PredictionResponse, ResponseMetadata, Tier,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::cache::PredictionCacheStore;
use crate::collector::EvidenceCollector;
use crate::cost::StageCost;
use crate::error::PipelineError;
use crate::event_store::EventStore;
use crate::extractor::EvidenceExtractor;
use crate::fetch::DocumentFetcher;
use crate::generator::ScenarioGenerator;
use crate::llm::LanguageModel;
use crate::normalize::{confidence_score, normalize};

/// Wires the collaborators together and runs the pipeline.
///
/// All collaborators are injected; nothing here instantiates a client
/// at load time, so every seam can be replaced with a fake.
pub struct Predictor {
    event_store: Arc<dyn EventStore>,
    search: Arc<dyn crate::search::WebSearch>,
    fetcher: Option<Arc<dyn DocumentFetcher>>,
    llm: Arc<dyn LanguageModel>,
    cache: Arc<dyn PredictionCacheStore>,
    /// Per-event-id generation gate. Grows with the set of distinct
    /// event ids seen by this process.
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Predictor {
    pub fn new(
        event_store: Arc<dyn EventStore>,
        search: Arc<dyn crate::search::WebSearch>,
        fetcher: Option<Arc<dyn DocumentFetcher>>,
        llm: Arc<dyn LanguageModel>,
        cache: Arc<dyn PredictionCacheStore>,
    ) -> Self {
        Self {
            event_store,
            search,
            fetcher,
            llm,
            cache,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Run one prediction request end to end.
    pub async fn generate_prediction(&self, request: &PredictionRequest) -> PredictionResponse {
        let started = Instant::now();

        // Cache check before anything else, unless a refresh is forced.
        if !request.force_refresh {
            if let Some(hit) = self.cache_lookup(&request.event_id).await {
                info!("Cache hit for {}", request.event_id);
                return PredictionResponse::ok(hit, true, metadata(true, started, StageCost::default()));
            }
        }

        // Single-flight: only one generation per event id at a time.
        let gate = {
            let mut inflight = self.inflight.lock().unwrap();
            inflight
                .entry(request.event_id.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let _guard = gate.lock().await;

        // A generation may have finished while we waited on the gate.
        if !request.force_refresh {
            if let Some(hit) = self.cache_lookup(&request.event_id).await {
                info!("Cache hit for {} after waiting on in-flight run", request.event_id);
                return PredictionResponse::ok(hit, true, metadata(true, started, StageCost::default()));
            }
        }

        // Cost survives a blown deadline, so the envelope can report
        // what was actually spent.
        let cost = Arc::new(Mutex::new(StageCost::default()));
        match self.run_pipeline(request, Arc::clone(&cost)).await {
            Ok(prediction) => {
                let spent = *cost.lock().unwrap();
                PredictionResponse::ok(prediction, false, metadata(false, started, spent))
            }
            Err(e) => {
                let spent = *cost.lock().unwrap();
                warn!("Prediction for {} failed: {}", request.event_id, e);
                PredictionResponse::err(e.to_string(), metadata(false, started, spent))
            }
        }
    }

    /// CHECK_CACHE has already happened; this is LOAD_EVENT through STORE.
    async fn run_pipeline(
        &self,
        request: &PredictionRequest,
        cost: Arc<Mutex<StageCost>>,
    ) -> Result<EventPrediction, PipelineError> {
        let event = self
            .event_store
            .get_event(&request.event_id)
            .await
            .map_err(PipelineError::Internal)?
            .ok_or_else(|| PipelineError::EventNotFound(request.event_id.clone()))?;

        let tier = request.tier.or(event.tier_hint).unwrap_or_default();
        info!("Generating {} prediction for {}", tier, event.event_id);

        let body = self.generate_body(&event, tier, Arc::clone(&cost));
        let prediction = match timeout(tier.deadline(), body).await {
            Ok(result) => result?,
            Err(_) => return Err(PipelineError::DeadlineExceeded(tier)),
        };

        // Cache write failures are logged, never surfaced.
        if let Err(e) = self.cache.put(&prediction).await {
            warn!("Cache write for {} failed: {}", prediction.event_id, e);
        }

        Ok(prediction)
    }

    /// COLLECT → EXTRACT → GENERATE → NORMALIZE, under the tier deadline.
    async fn generate_body(
        &self,
        event: &foresight_common::EventData,
        tier: Tier,
        cost: Arc<Mutex<StageCost>>,
    ) -> Result<EventPrediction, PipelineError> {
        let collector = EvidenceCollector::new(self.search.as_ref(), self.llm.as_ref());
        let collected = collector
            .collect(event, tier)
            .await
            .map_err(PipelineError::Internal)?;
        cost.lock().unwrap().absorb(collected.cost);

        let extractor = match &self.fetcher {
            Some(fetcher) => EvidenceExtractor::new(fetcher.as_ref()),
            None => EvidenceExtractor::without_fetcher(),
        };
        let extracted = extractor
            .extract(&collected.articles, tier)
            .await
            .map_err(PipelineError::Internal)?;
        cost.lock().unwrap().absorb(extracted.cost);

        let generator = ScenarioGenerator::new(self.llm.as_ref());
        let generated = generator
            .generate(event, &extracted.evidence, &collected.historical_patterns, tier)
            .await?;
        cost.lock().unwrap().absorb(generated.cost);

        let (outlooks, probability_check) = normalize(generated.outlooks);
        let score = confidence_score(&outlooks);

        let now = Utc::now();
        Ok(EventPrediction {
            event_id: event.event_id.clone(),
            generated_at: now,
            ttl_expires_at: now + tier.cache_ttl(),
            assumptions: generated.assumptions,
            outlooks,
            probability_check,
            tier,
            evidence_count: extracted.evidence.len() + collected.historical_patterns.len(),
            historical_patterns_count: collected.historical_patterns.len(),
            confidence_score: score,
        })
    }

    /// Cache read errors degrade to a miss.
    async fn cache_lookup(&self, event_id: &str) -> Option<EventPrediction> {
        match self.cache.get(event_id).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache read for {} failed: {}", event_id, e);
                None
            }
        }
    }
}

fn metadata(cache_hit: bool, started: Instant, cost: StageCost) -> ResponseMetadata {
    ResponseMetadata {
        cache_hit,
        generation_time_ms: started.elapsed().as_millis() as u64,
        api_calls_count: cost.api_calls,
        estimated_cost_usd: cost.estimated_cost_usd,
    }
}
