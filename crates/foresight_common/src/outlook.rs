//! Outlooks - probabilistic future scenarios for one event.

use crate::evidence::EvidenceItem;
use serde::{Deserialize, Serialize};

/// Fixed set of time horizons an outlook may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeHorizon {
    #[serde(rename = "1-2 weeks")]
    Weeks1To2,
    #[serde(rename = "1-3 months")]
    Months1To3,
    #[serde(rename = "6-12 months")]
    Months6To12,
    #[serde(rename = "1-2 years")]
    Years1To2,
    #[serde(rename = "2+ years")]
    Years2Plus,
}

/// Qualitative confidence attached to one outlook by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Weight used when folding per-outlook confidence into the
    /// prediction-level confidence score.
    pub fn weight(&self) -> f64 {
        match self {
            ConfidenceLevel::High => 0.8,
            ConfidenceLevel::Medium => 0.5,
            ConfidenceLevel::Low => 0.3,
        }
    }
}

/// One probabilistic scenario with its causal story and evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outlook {
    pub id: String,
    pub title: String,
    /// Calibrated probability in [0, 1]; the full outlook set sums to
    /// 1.0 after normalization.
    pub probability: f64,
    pub time_horizon: TimeHorizon,
    /// 2-4 sentence causal narrative for how this scenario unfolds.
    pub mechanism: String,
    pub supporting_evidence: Vec<EvidenceItem>,
    /// Required for the top-probability outlooks, optional elsewhere.
    #[serde(default)]
    pub counter_evidence: Vec<EvidenceItem>,
    /// 2-5 observable signals to judge whether the scenario is materializing.
    pub watch_indicators: Vec<String>,
    pub confidence: ConfidenceLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_horizon_literals() {
        let json = serde_json::to_string(&TimeHorizon::Months6To12).unwrap();
        assert_eq!(json, "\"6-12 months\"");
        let horizon: TimeHorizon = serde_json::from_str("\"2+ years\"").unwrap();
        assert_eq!(horizon, TimeHorizon::Years2Plus);
        assert!(serde_json::from_str::<TimeHorizon>("\"3-4 decades\"").is_err());
    }

    #[test]
    fn test_confidence_weights() {
        assert_eq!(ConfidenceLevel::High.weight(), 0.8);
        assert_eq!(ConfidenceLevel::Medium.weight(), 0.5);
        assert_eq!(ConfidenceLevel::Low.weight(), 0.3);
    }

    #[test]
    fn test_counter_evidence_defaults_empty() {
        let json = r#"{
            "id": "o1",
            "title": "Strike settles within a month",
            "probability": 0.4,
            "time_horizon": "1-3 months",
            "mechanism": "Mediation pressure builds. Both sides settle.",
            "supporting_evidence": [],
            "watch_indicators": ["mediator appointment", "union vote"],
            "confidence": "medium"
        }"#;
        let outlook: Outlook = serde_json::from_str(json).unwrap();
        assert!(outlook.counter_evidence.is_empty());
        assert_eq!(outlook.confidence, ConfidenceLevel::Medium);
    }
}
