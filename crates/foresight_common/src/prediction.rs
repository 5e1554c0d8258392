//! The persisted prediction aggregate and the request/response envelope.

use crate::outlook::Outlook;
use crate::tier::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit record of the probability normalization step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityCheck {
    /// Post-normalization sum (1.0 within floating-point epsilon).
    pub sum: f64,
    pub method: String,
    /// Sum as the model produced it, before any correction.
    pub original_sum: f64,
}

/// One successful pipeline run for one event. Superseded, never
/// mutated, by the next run once the TTL elapses or a refresh is forced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPrediction {
    pub event_id: String,
    pub generated_at: DateTime<Utc>,
    pub ttl_expires_at: DateTime<Utc>,
    pub assumptions: Vec<String>,
    pub outlooks: Vec<Outlook>,
    pub probability_check: ProbabilityCheck,
    pub tier: Tier,
    pub evidence_count: usize,
    pub historical_patterns_count: usize,
    /// Headline trust scalar in [0, 1].
    pub confidence_score: f64,
}

impl EventPrediction {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.ttl_expires_at
    }
}

/// Incoming request for one prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(default)]
    pub force_refresh: bool,
}

impl PredictionRequest {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            tier: None,
            force_refresh: false,
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

/// Observability counters attached to every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub cache_hit: bool,
    pub generation_time_ms: u64,
    pub api_calls_count: u32,
    pub estimated_cost_usd: f64,
}

/// Uniform envelope returned to callers regardless of which stage
/// produced the result. Callers branch only on `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<EventPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl PredictionResponse {
    pub fn ok(prediction: EventPrediction, from_cache: bool, metadata: ResponseMetadata) -> Self {
        Self {
            success: true,
            prediction: Some(prediction),
            from_cache: Some(from_cache),
            error: None,
            metadata: Some(metadata),
        }
    }

    pub fn err(message: impl Into<String>, metadata: ResponseMetadata) -> Self {
        Self {
            success: false,
            prediction: None,
            from_cache: None,
            error: Some(message.into()),
            metadata: Some(metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn minimal_prediction(expires_in: Duration) -> EventPrediction {
        let now = Utc::now();
        EventPrediction {
            event_id: "evt-1".to_string(),
            generated_at: now,
            ttl_expires_at: now + expires_in,
            assumptions: vec![],
            outlooks: vec![],
            probability_check: ProbabilityCheck {
                sum: 1.0,
                method: "normalize".to_string(),
                original_sum: 0.97,
            },
            tier: Tier::Fast,
            evidence_count: 0,
            historical_patterns_count: 0,
            confidence_score: 0.5,
        }
    }

    #[test]
    fn test_expiry() {
        let fresh = minimal_prediction(Duration::hours(1));
        assert!(!fresh.is_expired(Utc::now()));

        let stale = minimal_prediction(Duration::hours(-1));
        assert!(stale.is_expired(Utc::now()));
    }

    #[test]
    fn test_request_defaults() {
        let json = r#"{"event_id": "evt-9"}"#;
        let request: PredictionRequest = serde_json::from_str(json).unwrap();
        assert!(!request.force_refresh);
        assert!(request.tier.is_none());
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = PredictionResponse::err(
            "Event not found: evt-404",
            ResponseMetadata {
                cache_hit: false,
                generation_time_ms: 2,
                api_calls_count: 0,
                estimated_cost_usd: 0.0,
            },
        );
        assert!(!response.success);
        assert!(response.prediction.is_none());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("prediction").is_none());
        assert_eq!(json["error"], "Event not found: evt-404");
    }
}
