//! Prompt building for scenario generation and historical analogues.
//!
//! Prompts are deterministic: same event, same evidence pool, same
//! tier, same text. Downstream numeric checks depend on that.

use foresight_common::{EventData, EvidenceItem, Tier};

/// Structural rules suffix for scenario generation (constant, always included).
const SCENARIO_RULES: &str = r#"

=== RULES (MANDATORY) ===
1. Probabilities across all outlooks must sum to approximately 1.0.
2. Every url in supporting_evidence and counter_evidence MUST be copied
   verbatim from the EVIDENCE list above. Never invent a url.
3. counter_evidence is REQUIRED for the two highest-probability outlooks.
4. Each outlook needs 2-5 watch_indicators (short observable signals).
5. mechanism is a 2-4 sentence causal narrative, not a restatement of the title.
6. time_horizon must be one of: "1-2 weeks", "1-3 months", "6-12 months",
   "1-2 years", "2+ years".
7. confidence must be one of: "high", "medium", "low".

Respond with ONLY a JSON object of this shape:
{
  "assumptions": ["..."],
  "outlooks": [
    {
      "id": "outlook-1",
      "title": "...",
      "probability": 0.0,
      "time_horizon": "1-3 months",
      "mechanism": "...",
      "supporting_evidence": [
        {"type": "article", "title": "...", "url": "...", "why_relevant": "..."}
      ],
      "counter_evidence": [],
      "watch_indicators": ["...", "..."],
      "confidence": "medium"
    }
  ]
}"#;

/// Build the scenario-generation prompt from the event, the evidence
/// pool, and the pre-extracted claims.
pub fn build_scenario_prompt(event: &EventData, evidence: &[EvidenceItem], tier: Tier) -> String {
    let mut prompt = format!(
        r#"You are a geopolitical and market scenario analyst.
Produce exactly {count} mutually-informative future outlooks for the event below,
with calibrated probabilities.

=== EVENT ===
Title: {title}
Summary: {summary}"#,
        count = tier.num_outlooks(),
        title = event.title,
        summary = event.summary,
    );

    if !event.entities.is_empty() {
        prompt.push_str(&format!("\nEntities: {}", event.entities.join(", ")));
    }
    if !event.countries.is_empty() {
        prompt.push_str(&format!("\nCountries: {}", event.countries.join(", ")));
    }
    if !event.topics.is_empty() {
        prompt.push_str(&format!("\nTopics: {}", event.topics.join(", ")));
    }

    prompt.push_str("\n\n=== EVIDENCE (cite urls from this list ONLY) ===");
    for (i, item) in evidence.iter().enumerate() {
        match item {
            EvidenceItem::Article {
                title,
                url,
                publisher,
                snippet,
                ..
            } => {
                prompt.push_str(&format!("\n[{}] ARTICLE: {} ({})", i + 1, title, url));
                if let Some(publisher) = publisher {
                    prompt.push_str(&format!("\n    Publisher: {}", publisher));
                }
                if let Some(snippet) = snippet {
                    prompt.push_str(&format!("\n    Excerpt: {}", snippet));
                }
            }
            EvidenceItem::HistoricalPattern {
                title,
                date_range,
                url,
                why_relevant,
            } => {
                prompt.push_str(&format!(
                    "\n[{}] HISTORICAL PATTERN: {} [{}] ({})\n    Relevance: {}",
                    i + 1,
                    title,
                    date_range,
                    url,
                    why_relevant
                ));
            }
        }
    }

    if !event.claims.is_empty() {
        prompt.push_str("\n\n=== PRE-EXTRACTED CLAIMS ===");
        for claim in &event.claims {
            prompt.push_str(&format!(
                "\n- [{}] {} (certainty: {:.2})",
                claim.claim_type, claim.text, claim.certainty
            ));
        }
    }

    prompt.push_str(SCENARIO_RULES);
    prompt
}

/// Build the historical-analogue proposal prompt used during evidence
/// collection.
pub fn build_analogue_prompt(event: &EventData) -> String {
    format!(
        r#"You are a historian of markets and geopolitics.
Name 2-3 well-known historical analogues to this event:

Title: {title}
Summary: {summary}

For each analogue give a real, citable source url, the date range of the
analogue, and a one-sentence explanation of why it is relevant.

Respond with ONLY a JSON array of this shape:
[
  {{"title": "...", "url": "https://...", "date_range": "1997-1998", "why_relevant": "..."}}
]"#,
        title = event.title,
        summary = event.summary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use foresight_common::Claim;

    fn sample_event() -> EventData {
        EventData {
            event_id: "evt-1".to_string(),
            title: "Port strike announced".to_string(),
            summary: "Dock workers announce an indefinite strike.".to_string(),
            sources: vec![],
            entities: vec!["ILWU".to_string(), "Port of LA".to_string()],
            countries: vec!["US".to_string()],
            topics: vec!["labor".to_string()],
            claims: vec![Claim {
                text: "Union rejected the latest offer".to_string(),
                claim_type: "factual".to_string(),
                certainty: 0.9,
            }],
            tier_hint: None,
            score: None,
        }
    }

    #[test]
    fn test_scenario_prompt_contains_count_and_evidence() {
        let evidence = vec![EvidenceItem::Article {
            title: "Strike coverage".to_string(),
            url: "https://example.org/strike".to_string(),
            publisher: Some("Example Wire".to_string()),
            date: None,
            snippet: Some("The strike began at dawn.".to_string()),
            why_relevant: "Primary coverage".to_string(),
        }];
        let prompt = build_scenario_prompt(&sample_event(), &evidence, Tier::Standard);
        assert!(prompt.contains("exactly 6"));
        assert!(prompt.contains("[1] ARTICLE: Strike coverage (https://example.org/strike)"));
        assert!(prompt.contains("certainty: 0.90"));
        assert!(prompt.contains("sum to approximately 1.0"));
    }

    #[test]
    fn test_scenario_prompt_is_deterministic() {
        let evidence = vec![];
        let a = build_scenario_prompt(&sample_event(), &evidence, Tier::Fast);
        let b = build_scenario_prompt(&sample_event(), &evidence, Tier::Fast);
        assert_eq!(a, b);
    }

    #[test]
    fn test_analogue_prompt_shape() {
        let prompt = build_analogue_prompt(&sample_event());
        assert!(prompt.contains("2-3 well-known historical analogues"));
        assert!(prompt.contains("date_range"));
    }
}
