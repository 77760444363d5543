//! Construct scheduler facades from validated configuration.

use crate::config::TriageConfig;
use crate::core::{
    ClassQueueSet, FairnessParams, Scheduler, ScoringEngine, ServiceClass, TriageError, Weights,
};

/// Build a [`Scheduler`] from a configuration, validating it first.
pub fn build_scheduler(cfg: &TriageConfig) -> Result<Scheduler, TriageError> {
    if let Err(reason) = cfg.weights.validate() {
        tracing::warn!(%reason, "scheduler build rejected");
        return Err(TriageError::InvalidWeights(
            cfg.weights.urgency + cfg.weights.wait + cfg.weights.class,
        ));
    }
    if let Err(reason) = cfg.fairness.validate() {
        tracing::warn!(%reason, "scheduler build rejected");
        return Err(TriageError::InvalidFairness);
    }

    let mut engine = ScoringEngine::new();
    engine.set_weights(Weights {
        urgency: cfg.weights.urgency,
        wait: cfg.weights.wait,
        class: cfg.weights.class,
    });
    for (&class, &score) in &cfg.class_scores {
        engine.set_class_score(class, score);
    }

    let queues = ClassQueueSet::new(FairnessParams {
        max_wait_minutes: cfg.fairness.max_wait_minutes,
        boost_multiplier: cfg.fairness.boost_multiplier,
    });

    Ok(Scheduler::from_parts(engine, queues))
}

/// Incremental builder over [`TriageConfig`], for callers assembling
/// configuration in code rather than parsing JSON.
#[derive(Debug, Default)]
pub struct SchedulerBuilder {
    cfg: TriageConfig,
}

impl SchedulerBuilder {
    /// Builder seeded with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the scoring weights.
    #[must_use]
    pub fn with_weights(mut self, urgency: f64, wait: f64, class: f64) -> Self {
        self.cfg.weights.urgency = urgency;
        self.cfg.weights.wait = wait;
        self.cfg.weights.class = class;
        self
    }

    /// Override one class's base score.
    #[must_use]
    pub fn with_class_score(mut self, class: ServiceClass, score: f64) -> Self {
        self.cfg.class_scores.insert(class, score);
        self
    }

    /// Override the fairness rules.
    #[must_use]
    pub fn with_fairness(mut self, max_wait_minutes: u32, boost_multiplier: f64) -> Self {
        self.cfg.fairness.max_wait_minutes = max_wait_minutes;
        self.cfg.fairness.boost_multiplier = boost_multiplier;
        self
    }

    /// Validate the accumulated configuration and build the scheduler.
    pub fn build(self) -> Result<Scheduler, TriageError> {
        build_scheduler(&self.cfg)
    }
}
