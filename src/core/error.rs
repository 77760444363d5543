//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced at the configuration and ingestion boundaries.
///
/// The engine itself has no fatal paths: dispatch on an empty queue and
/// dispatch-by-id misses are `Option`s, never errors.
#[derive(Debug, Error)]
pub enum TriageError {
    /// Priority weights must sum to 1.0.
    #[error("weights must sum to 1.0, got {0}")]
    InvalidWeights(f64),
    /// Fairness parameters must both be positive.
    #[error("fairness parameters must be positive")]
    InvalidFairness,
    /// Urgency is outside the accepted 1..=5 range.
    #[error("urgency must be between 1 and 5, got {0}")]
    InvalidUrgency(u8),
    /// Malformed JSON at the event/config ingestion boundary.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
