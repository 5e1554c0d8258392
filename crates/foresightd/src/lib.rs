//! Foresight daemon library - the probabilistic scenario prediction
//! pipeline and its collaborator clients.

pub mod cache;
pub mod collector;
pub mod config;
pub mod cost;
pub mod error;
pub mod event_store;
pub mod extractor;
pub mod fakes;
pub mod fetch;
pub mod generator;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod search;

pub use error::PipelineError;
pub use pipeline::Predictor;
