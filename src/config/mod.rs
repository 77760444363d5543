//! Configuration models for weights, class scores, and fairness rules.

pub mod triage;

pub use triage::{FairnessConfig, TriageConfig, WeightsConfig};
