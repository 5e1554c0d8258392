//! Shared data shapes for the Foresight scenario prediction pipeline.
//!
//! Everything in this crate is plain data: serde types plus small pure
//! helpers (tier parameters, confidence weights, probability checks).
//! All I/O lives in `foresightd`.

pub mod event;
pub mod evidence;
pub mod outlook;
pub mod prediction;
pub mod tier;

pub use event::{Claim, EventData, EventSource};
pub use evidence::{EvidenceItem, UNCONFIRMED_TITLE, UNCONFIRMED_URL};
pub use outlook::{ConfidenceLevel, Outlook, TimeHorizon};
pub use prediction::{
    EventPrediction, PredictionRequest, PredictionResponse, ProbabilityCheck, ResponseMetadata,
};
pub use tier::Tier;
