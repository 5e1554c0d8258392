//! Upstream event projection.
//!
//! `EventData` is produced by the extraction pipeline upstream of this
//! service. The prediction core only ever reads it.

use crate::tier::Tier;
use serde::{Deserialize, Serialize};

/// A source already attached to the event by the upstream extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSource {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Publication date as provided upstream (free-form, e.g. "2026-08-12").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// A claim pre-extracted from the event's coverage, with the upstream
/// extractor's certainty in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    pub claim_type: String,
    pub certainty: f64,
}

/// Read-only projection of an upstream event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub event_id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub sources: Vec<EventSource>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub claims: Vec<Claim>,
    /// Tier suggested by the upstream scorer; the request may override it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_hint: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}
