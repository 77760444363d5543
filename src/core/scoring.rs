//! Priority scoring engine.
//!
//! Pure function over its inputs plus the engine's weight/base configuration:
//! no clock access, no queue mutation. Weight-sum validation is a boundary
//! concern (see the scheduler facade and config models); the engine must keep
//! functioning with arbitrary bases so it stays testable in isolation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::patient::{Patient, ServiceClass, Timestamp};

/// Relative weights of the three scoring terms. Intended to sum to 1.0 for
/// score comparability; the engine itself does not enforce that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    /// Weight applied to the urgency level.
    pub urgency: f64,
    /// Weight applied to the elapsed wait in seconds.
    pub wait: f64,
    /// Weight applied to the service-class base score.
    pub class: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            urgency: 0.5,
            wait: 0.3,
            class: 0.2,
        }
    }
}

/// Stepped bonus rewarding repeat admissions of the same identity.
///
/// Deliberately non-linear: chronic/frequent cases jump tiers rather than
/// accruing smoothly, and ties within a tier are broken by the other terms.
#[must_use]
pub fn visit_bonus(visits: u32) -> f64 {
    match visits {
        0..=4 => 0.0,
        5..=9 => 0.5,
        10..=24 => 1.0,
        _ => 2.0,
    }
}

/// Computes priority scores from urgency, wait time, class base score, and
/// the repeat-visit bonus.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: Weights,
    class_scores: HashMap<ServiceClass, f64>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        let mut class_scores = HashMap::new();
        class_scores.insert(ServiceClass::Emergency, 10.0);
        class_scores.insert(ServiceClass::Critical, 8.0);
        class_scores.insert(ServiceClass::Checkup, 5.0);
        Self {
            weights: Weights::default(),
            class_scores,
        }
    }
}

impl ScoringEngine {
    /// Engine with the default weights (0.5/0.3/0.2) and base scores
    /// (Emergency 10, Critical 8, Checkup 5).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the three term weights. Unchecked here; the configuration
    /// boundary rejects sets that do not sum to 1.0.
    pub fn set_weights(&mut self, weights: Weights) {
        self.weights = weights;
    }

    /// Current term weights.
    #[must_use]
    pub const fn weights(&self) -> Weights {
        self.weights
    }

    /// Set the base score for one service class. Append-only in spirit:
    /// entries are never validated against queued patients.
    pub fn set_class_score(&mut self, class: ServiceClass, score: f64) {
        self.class_scores.insert(class, score);
    }

    /// Base score for a class; a class missing from the table scores 0.
    #[must_use]
    pub fn class_score(&self, class: ServiceClass) -> f64 {
        self.class_scores.get(&class).copied().unwrap_or(0.0)
    }

    /// Score a patient at `now` given its visit count.
    ///
    /// `urgency * w_urgency + wait_seconds * w_wait + base(class) * w_class
    /// + visit_bonus(visits)`.
    #[must_use]
    pub fn score(&self, patient: &Patient, now: Timestamp, visits: u32) -> f64 {
        let wait = patient.wait_seconds(now) as f64;
        f64::from(patient.urgency) * self.weights.urgency
            + wait * self.weights.wait
            + self.class_score(patient.service_class) * self.weights.class
            + visit_bonus(visits)
    }
}
