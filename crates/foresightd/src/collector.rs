//! Evidence collection - gather candidate articles and historical
//! patterns for one event.
//!
//! Three sources feed the pool: the event's own known sources, a
//! supporting-evidence search, and a historical-pattern search plus an
//! LLM pass proposing well-known analogues. Any individual sub-call
//! failing is logged and skipped; partial evidence is acceptable.

use anyhow::Result;
use foresight_common::{EventData, EvidenceItem, Tier};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::cost::{StageCost, LLM_CALL_COST_USD, SEARCH_CALL_COST_USD};
use crate::llm::LanguageModel;
use crate::prompts::build_analogue_prompt;
use crate::search::{ArticleHit, SearchDepth, SearchOptions, WebSearch};

/// Hard cap on the article list handed to the extractor.
const MAX_ARTICLES: usize = 20;

/// Minimum relevance for supporting-evidence hits.
const SUPPORT_MIN_SCORE: f64 = 0.5;

/// Minimum relevance for historical-pattern hits. Patterns are
/// intentionally noisier, so the bar is lower.
const PATTERN_MIN_SCORE: f64 = 0.3;

/// Everything collection produced for one request.
#[derive(Debug)]
pub struct CollectedEvidence {
    pub articles: Vec<ArticleHit>,
    pub historical_patterns: Vec<EvidenceItem>,
    pub cost: StageCost,
}

/// One analogue proposed by the model.
#[derive(Debug, Deserialize)]
struct ProposedAnalogue {
    title: String,
    url: String,
    date_range: String,
    why_relevant: String,
}

pub struct EvidenceCollector<'a> {
    search: &'a dyn WebSearch,
    llm: &'a dyn LanguageModel,
}

impl<'a> EvidenceCollector<'a> {
    pub fn new(search: &'a dyn WebSearch, llm: &'a dyn LanguageModel) -> Self {
        Self { search, llm }
    }

    /// Gather the candidate evidence pool. Never fails outright: every
    /// sub-call failure degrades to whatever was already gathered.
    pub async fn collect(&self, event: &EventData, tier: Tier) -> Result<CollectedEvidence> {
        let mut cost = StageCost::default();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut articles: Vec<ArticleHit> = Vec::new();

        // Seed from the event's own sources.
        for source in &event.sources {
            if seen_urls.insert(source.url.clone()) {
                articles.push(ArticleHit {
                    title: source.title.clone(),
                    url: source.url.clone(),
                    publisher: source.publisher.clone(),
                    date: source.date.clone(),
                    snippet: None,
                    score: 1.0,
                });
            }
        }

        // Supporting-evidence search.
        let query = format!("{} {}", event.title, event.summary);
        let options = SearchOptions {
            max_results: tier.search_result_cap(),
            min_score: SUPPORT_MIN_SCORE,
            depth: match tier {
                Tier::Deep => SearchDepth::Advanced,
                _ => SearchDepth::Basic,
            },
        };
        cost.record(SEARCH_CALL_COST_USD);
        match self.search.search(&query, &options).await {
            Ok(hits) => {
                for hit in hits {
                    if seen_urls.insert(hit.url.clone()) {
                        articles.push(hit);
                    }
                }
            }
            Err(e) => warn!("Supporting-evidence search failed: {}", e),
        }

        // Historical-pattern search with a broader query and lower bar.
        let mut historical_patterns: Vec<EvidenceItem> = Vec::new();
        let pattern_query = {
            let mut parts = vec![event.title.clone()];
            parts.extend(event.entities.iter().take(2).cloned());
            format!("historical precedent {}", parts.join(" "))
        };
        let pattern_options = SearchOptions {
            max_results: 3,
            min_score: PATTERN_MIN_SCORE,
            depth: SearchDepth::Basic,
        };
        cost.record(SEARCH_CALL_COST_USD);
        match self.search.search(&pattern_query, &pattern_options).await {
            Ok(hits) => {
                for hit in hits {
                    if seen_urls.insert(hit.url.clone()) {
                        historical_patterns.push(EvidenceItem::HistoricalPattern {
                            title: hit.title,
                            date_range: hit.date.unwrap_or_else(|| "unknown".to_string()),
                            url: hit.url,
                            why_relevant: hit
                                .snippet
                                .unwrap_or_else(|| "Surfaced by pattern search".to_string()),
                        });
                    }
                }
            }
            Err(e) => warn!("Historical-pattern search failed: {}", e),
        }

        // LLM analogue proposal. Failure here is never fatal either.
        cost.record(LLM_CALL_COST_USD);
        match self.propose_analogues(event).await {
            Ok(analogues) => {
                for analogue in analogues.into_iter().take(3) {
                    if seen_urls.insert(analogue.url.clone()) {
                        historical_patterns.push(EvidenceItem::HistoricalPattern {
                            title: analogue.title,
                            date_range: analogue.date_range,
                            url: analogue.url,
                            why_relevant: analogue.why_relevant,
                        });
                    }
                }
            }
            Err(e) => warn!("Analogue proposal failed: {}", e),
        }

        articles.truncate(MAX_ARTICLES);
        debug!(
            "Collected {} articles and {} historical patterns for {}",
            articles.len(),
            historical_patterns.len(),
            event.event_id
        );

        Ok(CollectedEvidence {
            articles,
            historical_patterns,
            cost,
        })
    }

    async fn propose_analogues(&self, event: &EventData) -> Result<Vec<ProposedAnalogue>> {
        let prompt = build_analogue_prompt(event);
        let raw = self.llm.complete(&prompt).await?;
        let trimmed = crate::generator::extract_json(&raw);
        let analogues: Vec<ProposedAnalogue> = serde_json::from_str(trimmed)?;
        Ok(analogues)
    }
}
