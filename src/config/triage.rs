//! Triage scheduler configuration structures.
//!
//! Validation happens here, at the boundary: the scoring engine and queue
//! set accept whatever they are handed and never re-check.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::error::TriageError;
use crate::core::patient::ServiceClass;

/// Scoring term weights. Must be non-negative and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Weight applied to the urgency level.
    pub urgency: f64,
    /// Weight applied to elapsed wait seconds.
    pub wait: f64,
    /// Weight applied to the class base score.
    pub class: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            urgency: 0.5,
            wait: 0.3,
            class: 0.2,
        }
    }
}

impl WeightsConfig {
    /// Validate non-negativity and the unit sum.
    pub fn validate(&self) -> Result<(), String> {
        if self.urgency < 0.0 || self.wait < 0.0 || self.class < 0.0 {
            return Err("weights must be non-negative".into());
        }
        let sum = self.urgency + self.wait + self.class;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("weights must sum to 1.0, got {sum}"));
        }
        Ok(())
    }
}

/// Aging rules applied during the periodic re-score pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessConfig {
    /// Wait threshold in minutes; must be positive.
    pub max_wait_minutes: u32,
    /// Boost per minute beyond the threshold; must be positive.
    pub boost_multiplier: f64,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            max_wait_minutes: 25,
            boost_multiplier: 0.5,
        }
    }
}

impl FairnessConfig {
    /// Validate that both parameters are positive.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_wait_minutes == 0 {
            return Err("max_wait_minutes must be greater than 0".into());
        }
        if self.boost_multiplier <= 0.0 {
            return Err("boost_multiplier must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Scoring term weights.
    #[serde(default)]
    pub weights: WeightsConfig,
    /// Base score per service class. Classes absent here score 0.
    #[serde(default = "default_class_scores")]
    pub class_scores: HashMap<ServiceClass, f64>,
    /// Aging rules.
    #[serde(default)]
    pub fairness: FairnessConfig,
}

fn default_class_scores() -> HashMap<ServiceClass, f64> {
    let mut scores = HashMap::new();
    scores.insert(ServiceClass::Emergency, 10.0);
    scores.insert(ServiceClass::Critical, 8.0);
    scores.insert(ServiceClass::Checkup, 5.0);
    scores
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            class_scores: default_class_scores(),
            fairness: FairnessConfig::default(),
        }
    }
}

impl TriageConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), String> {
        self.weights
            .validate()
            .map_err(|e| format!("weights invalid: {e}"))?;
        self.fairness
            .validate()
            .map_err(|e| format!("fairness invalid: {e}"))?;
        Ok(())
    }

    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json_str(input: &str) -> Result<Self, TriageError> {
        let cfg: Self = serde_json::from_str(input)?;
        if let Err(reason) = cfg.weights.validate() {
            tracing::warn!(%reason, "rejected configuration");
            let sum = cfg.weights.urgency + cfg.weights.wait + cfg.weights.class;
            return Err(TriageError::InvalidWeights(sum));
        }
        if let Err(reason) = cfg.fairness.validate() {
            tracing::warn!(%reason, "rejected configuration");
            return Err(TriageError::InvalidFairness);
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TriageConfig::default().validate().is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let bad = WeightsConfig {
            urgency: 0.6,
            wait: 0.6,
            class: 0.2,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let bad = WeightsConfig {
            urgency: -0.1,
            wait: 0.9,
            class: 0.2,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_fairness_bounds() {
        assert!(FairnessConfig::default().validate().is_ok());
        assert!(FairnessConfig {
            max_wait_minutes: 0,
            boost_multiplier: 0.5
        }
        .validate()
        .is_err());
        assert!(FairnessConfig {
            max_wait_minutes: 25,
            boost_multiplier: 0.0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "weights": { "urgency": 0.4, "wait": 0.4, "class": 0.2 },
            "class_scores": { "Emergency": 12.0, "Critical": 7.0 },
            "fairness": { "max_wait_minutes": 30, "boost_multiplier": 0.25 }
        }"#;
        let cfg = TriageConfig::from_json_str(json).expect("valid config");
        assert_eq!(cfg.fairness.max_wait_minutes, 30);
        assert_eq!(cfg.class_scores.get(&ServiceClass::Emergency), Some(&12.0));
        // Checkup omitted: scores 0 downstream, by design.
        assert!(!cfg.class_scores.contains_key(&ServiceClass::Checkup));
    }

    #[test]
    fn test_from_json_str_defaults_sections() {
        let cfg = TriageConfig::from_json_str("{}").expect("defaults fill in");
        assert_eq!(cfg, TriageConfig::default());
    }

    #[test]
    fn test_from_json_str_rejects_bad_weights() {
        let json = r#"{ "weights": { "urgency": 1.0, "wait": 1.0, "class": 1.0 } }"#;
        assert!(TriageConfig::from_json_str(json).is_err());
    }
}
