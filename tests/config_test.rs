//! Tests for configuration validation and the scheduler builder.

use triage_queue::builders::{build_scheduler, SchedulerBuilder};
use triage_queue::config::{FairnessConfig, TriageConfig, WeightsConfig};
use triage_queue::core::{ServiceClass, TriageError};

#[test]
fn test_default_config_builds() {
    let cfg = TriageConfig::default();
    assert!(cfg.validate().is_ok());
    assert!(build_scheduler(&cfg).is_ok());
}

#[test]
fn test_weights_sum_enforced_at_boundary_only() {
    let cfg = TriageConfig {
        weights: WeightsConfig {
            urgency: 0.7,
            wait: 0.7,
            class: 0.7,
        },
        ..TriageConfig::default()
    };
    assert!(matches!(
        build_scheduler(&cfg),
        Err(TriageError::InvalidWeights(_))
    ));
}

#[test]
fn test_fairness_enforced_at_boundary() {
    let cfg = TriageConfig {
        fairness: FairnessConfig {
            max_wait_minutes: 0,
            boost_multiplier: 0.5,
        },
        ..TriageConfig::default()
    };
    assert!(matches!(
        build_scheduler(&cfg),
        Err(TriageError::InvalidFairness)
    ));
}

#[test]
fn test_config_json_round_trip() {
    let json = r#"{
        "weights": { "urgency": 0.6, "wait": 0.2, "class": 0.2 },
        "class_scores": { "Emergency": 10.0, "Critical": 8.0, "Checkup": 5.0 },
        "fairness": { "max_wait_minutes": 45, "boost_multiplier": 0.75 }
    }"#;
    let cfg = TriageConfig::from_json_str(json).expect("valid config");
    let scheduler = build_scheduler(&cfg).expect("valid config builds");

    assert_eq!(scheduler.engine().weights().urgency, 0.6);
    assert_eq!(scheduler.engine().class_score(ServiceClass::Critical), 8.0);
    assert_eq!(scheduler.queues().fairness().max_wait_minutes, 45);
}

#[test]
fn test_config_json_parse_failure() {
    assert!(matches!(
        TriageConfig::from_json_str("{ not json"),
        Err(TriageError::Parse(_))
    ));
}

#[test]
fn test_builder_facade_config_agreement() {
    // Builder and facade enforce the same boundary rules.
    let via_builder = SchedulerBuilder::new().with_weights(0.2, 0.2, 0.2).build();
    assert!(via_builder.is_err());

    let mut scheduler = SchedulerBuilder::new().build().expect("defaults valid");
    assert!(scheduler.set_weights(0.2, 0.2, 0.2).is_err());
    assert!(scheduler.set_weights(0.6, 0.2, 0.2).is_ok());
}
