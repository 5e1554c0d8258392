//! Pipeline error taxonomy.
//!
//! Only two failure classes reach the caller: a missing event and a
//! failed generation (model error, malformed output, or blown
//! deadline). Degraded upstream searches and cache-write failures are
//! absorbed at their call sites.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested event does not exist upstream. Not retried.
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// The language model call failed or its output did not match the
    /// required schema. Fatal for the whole request; there is no
    /// partial-outlook fallback.
    #[error("Scenario generation failed: {0}")]
    Generation(String),

    /// The per-tier wall-clock budget elapsed before the pipeline finished.
    #[error("Generation exceeded the {0} tier deadline")]
    DeadlineExceeded(foresight_common::Tier),

    /// Unexpected infrastructure failure (event store unreachable, etc).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
