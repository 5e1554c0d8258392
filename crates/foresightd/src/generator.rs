//! Scenario generation - ask the model for tier-many outlooks and
//! validate every evidentiary claim against the evidence pool.
//!
//! Parsing is strict: the model's output must match the required
//! schema or the whole request fails. There is no regex repair and no
//! partial-outlook fallback. Reference repair is the one permitted
//! correction: a url the pool does not contain is replaced with the
//! explicit unconfirmed sentinel, because a fabricated but
//! present-looking citation is worse than an honest marker.

use foresight_common::{
    ConfidenceLevel, EventData, EvidenceItem, Outlook, Tier, TimeHorizon,
};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cost::{StageCost, LLM_CALL_COST_USD};
use crate::error::PipelineError;
use crate::llm::LanguageModel;
use crate::prompts::build_scenario_prompt;

#[derive(Debug)]
pub struct GeneratedScenarios {
    pub outlooks: Vec<Outlook>,
    pub assumptions: Vec<String>,
    pub cost: StageCost,
}

/// Outlook as the model emits it: id optional, evidence unchecked.
#[derive(Debug, Deserialize)]
struct RawOutlook {
    #[serde(default)]
    id: Option<String>,
    title: String,
    probability: f64,
    time_horizon: TimeHorizon,
    mechanism: String,
    supporting_evidence: Vec<EvidenceItem>,
    #[serde(default)]
    counter_evidence: Vec<EvidenceItem>,
    watch_indicators: Vec<String>,
    confidence: ConfidenceLevel,
}

#[derive(Debug, Deserialize)]
struct RawScenarioResponse {
    #[serde(default)]
    assumptions: Vec<String>,
    outlooks: Vec<RawOutlook>,
}

pub struct ScenarioGenerator<'a> {
    llm: &'a dyn LanguageModel,
}

impl<'a> ScenarioGenerator<'a> {
    pub fn new(llm: &'a dyn LanguageModel) -> Self {
        Self { llm }
    }

    /// Request tier-many outlooks and repair their evidence references
    /// against the pool. A model error or malformed output is fatal.
    pub async fn generate(
        &self,
        event: &EventData,
        evidence: &[EvidenceItem],
        historical_patterns: &[EvidenceItem],
        tier: Tier,
    ) -> Result<GeneratedScenarios, PipelineError> {
        let mut cost = StageCost::default();

        // Patterns are part of the citable pool.
        let mut pool: Vec<EvidenceItem> = evidence.to_vec();
        pool.extend(historical_patterns.iter().cloned());
        let pool_urls: HashSet<&str> = pool.iter().map(|e| e.url()).collect();

        let prompt = build_scenario_prompt(event, &pool, tier);
        cost.record(LLM_CALL_COST_USD);
        let raw = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| PipelineError::Generation(format!("Model call failed: {}", e)))?;

        let parsed: RawScenarioResponse = serde_json::from_str(extract_json(&raw))
            .map_err(|e| PipelineError::Generation(format!("Malformed scenario output: {}", e)))?;

        if parsed.outlooks.is_empty() {
            return Err(PipelineError::Generation(
                "Model returned zero outlooks".to_string(),
            ));
        }

        let wanted = tier.num_outlooks();
        if parsed.outlooks.len() > wanted {
            info!(
                "Model over-produced {} outlooks, truncating to {}",
                parsed.outlooks.len(),
                wanted
            );
        }

        let outlooks: Vec<Outlook> = parsed
            .outlooks
            .into_iter()
            .take(wanted)
            .enumerate()
            .map(|(i, raw)| finish_outlook(raw, i, &pool_urls))
            .collect();

        Ok(GeneratedScenarios {
            outlooks,
            assumptions: parsed.assumptions,
            cost,
        })
    }
}

/// Assign an id when missing and repair evidence references.
fn finish_outlook(raw: RawOutlook, index: usize, pool_urls: &HashSet<&str>) -> Outlook {
    Outlook {
        id: raw
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("outlook-{}-{}", index + 1, Uuid::new_v4())),
        title: raw.title,
        probability: raw.probability,
        time_horizon: raw.time_horizon,
        mechanism: raw.mechanism,
        supporting_evidence: repair_references(raw.supporting_evidence, pool_urls),
        counter_evidence: repair_references(raw.counter_evidence, pool_urls),
        watch_indicators: raw.watch_indicators,
        confidence: raw.confidence,
    }
}

/// Replace every citation whose url is outside the pool with the
/// unconfirmed sentinel, preserving list positions.
fn repair_references(items: Vec<EvidenceItem>, pool_urls: &HashSet<&str>) -> Vec<EvidenceItem> {
    items
        .into_iter()
        .map(|item| {
            if pool_urls.contains(item.url()) {
                item
            } else {
                warn!("Fabricated citation repaired: {}", item.url());
                EvidenceItem::unconfirmed()
            }
        })
        .collect()
}

/// Strip a fenced code block or surrounding prose down to the last
/// balanced-looking JSON span. The result must still parse strictly.
pub(crate) fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let start = trimmed.find(|c| c == '{' || c == '[');
    let end = trimmed.rfind(|c| c == '}' || c == ']');
    match (start, end) {
        (Some(s), Some(e)) if s <= e => &trimmed[s..=e],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeLanguageModel;

    fn event() -> EventData {
        EventData {
            event_id: "evt-1".to_string(),
            title: "Port strike announced".to_string(),
            summary: "Dock workers strike.".to_string(),
            sources: vec![],
            entities: vec![],
            countries: vec![],
            topics: vec![],
            claims: vec![],
            tier_hint: None,
            score: None,
        }
    }

    fn pool_item(url: &str) -> EvidenceItem {
        EvidenceItem::Article {
            title: "pooled".to_string(),
            url: url.to_string(),
            publisher: None,
            date: None,
            snippet: None,
            why_relevant: "coverage".to_string(),
        }
    }

    fn outlook_json(probability: f64, url: &str) -> String {
        format!(
            r#"{{
                "title": "Scenario",
                "probability": {probability},
                "time_horizon": "1-3 months",
                "mechanism": "Things happen. Then more things happen.",
                "supporting_evidence": [
                    {{"type": "article", "title": "cited", "url": "{url}",
                      "why_relevant": "backs the claim"}}
                ],
                "watch_indicators": ["signal one", "signal two"],
                "confidence": "medium"
            }}"#
        )
    }

    fn response_json(outlooks: &[String]) -> String {
        format!(
            r#"{{"assumptions": ["markets stay open"], "outlooks": [{}]}}"#,
            outlooks.join(",")
        )
    }

    #[tokio::test]
    async fn test_fabricated_citation_replaced_with_sentinel() {
        let body = response_json(&[
            outlook_json(0.4, "https://example.org/real"),
            outlook_json(0.3, "https://made-up.invalid/ghost"),
            outlook_json(0.3, "https://example.org/real"),
        ]);
        let llm = FakeLanguageModel::completing(vec![body]);
        let generator = ScenarioGenerator::new(&llm);

        let result = generator
            .generate(&event(), &[pool_item("https://example.org/real")], &[], Tier::Fast)
            .await
            .unwrap();

        assert_eq!(result.outlooks.len(), 3);
        assert!(!result.outlooks[0].supporting_evidence[0].is_unconfirmed());
        assert!(result.outlooks[1].supporting_evidence[0].is_unconfirmed());
        assert_eq!(
            result.outlooks[1].supporting_evidence[0].url(),
            "Not confirmed by available sources."
        );
    }

    #[tokio::test]
    async fn test_historical_patterns_are_citable() {
        let pattern = EvidenceItem::HistoricalPattern {
            title: "1971 strike".to_string(),
            date_range: "1971-1972".to_string(),
            url: "https://example.org/1971".to_string(),
            why_relevant: "same ports".to_string(),
        };
        let body = response_json(&[
            outlook_json(0.5, "https://example.org/1971"),
            outlook_json(0.3, "https://example.org/1971"),
            outlook_json(0.2, "https://example.org/1971"),
        ]);
        let llm = FakeLanguageModel::completing(vec![body]);
        let generator = ScenarioGenerator::new(&llm);

        let result = generator
            .generate(&event(), &[], std::slice::from_ref(&pattern), Tier::Fast)
            .await
            .unwrap();
        assert!(result
            .outlooks
            .iter()
            .all(|o| !o.supporting_evidence[0].is_unconfirmed()));
    }

    #[tokio::test]
    async fn test_over_production_truncated_to_tier() {
        let outlooks: Vec<String> = (0..7)
            .map(|_| outlook_json(0.14, "https://example.org/real"))
            .collect();
        let llm = FakeLanguageModel::completing(vec![response_json(&outlooks)]);
        let generator = ScenarioGenerator::new(&llm);

        let result = generator
            .generate(&event(), &[pool_item("https://example.org/real")], &[], Tier::Fast)
            .await
            .unwrap();
        assert_eq!(result.outlooks.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_output_is_fatal() {
        let llm = FakeLanguageModel::completing(vec!["not json at all".to_string()]);
        let generator = ScenarioGenerator::new(&llm);

        let err = generator
            .generate(&event(), &[], &[], Tier::Fast)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }

    #[tokio::test]
    async fn test_fenced_json_is_accepted() {
        let body = format!(
            "```json\n{}\n```",
            response_json(&[outlook_json(1.0, "https://example.org/real")])
        );
        let llm = FakeLanguageModel::completing(vec![body]);
        let generator = ScenarioGenerator::new(&llm);

        let result = generator
            .generate(&event(), &[pool_item("https://example.org/real")], &[], Tier::Fast)
            .await
            .unwrap();
        assert_eq!(result.outlooks.len(), 1);
        assert!(!result.outlooks[0].id.is_empty());
    }

    #[tokio::test]
    async fn test_zero_outlooks_is_fatal() {
        let llm =
            FakeLanguageModel::completing(vec![r#"{"assumptions": [], "outlooks": []}"#.to_string()]);
        let generator = ScenarioGenerator::new(&llm);

        let err = generator
            .generate(&event(), &[], &[], Tier::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }
}
