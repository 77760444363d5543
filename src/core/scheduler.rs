//! Scheduler facade composing the scoring engine, class queue set, and
//! history ledger.
//!
//! Owns no business logic beyond argument threading; the one exception is
//! the configuration boundary, where weight and fairness validation lives so
//! the inner engine never has to re-check.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::core::error::TriageError;
use crate::core::history::{HistoryLedger, ServiceRecord};
use crate::core::patient::{Patient, PatientId, ServiceClass, Timestamp};
use crate::core::queues::{ClassQueueSet, FairnessParams};
use crate::core::scoring::{ScoringEngine, Weights};

/// Weight sums within this distance of 1.0 are accepted.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Per-class queue counts for the status surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    counts: [usize; ServiceClass::COUNT],
}

impl QueueStatus {
    /// Patients currently held by the given class's queue.
    #[must_use]
    pub const fn count(&self, class: ServiceClass) -> usize {
        self.counts[class.rank()]
    }

    /// Patients across all queues.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for class in ServiceClass::ALL {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{class}: {}", self.count(class))?;
            first = false;
        }
        Ok(())
    }
}

/// The operations external callers use: configure, admit, dispatch, rescore,
/// status, and history queries.
#[derive(Debug, Default)]
pub struct Scheduler {
    engine: ScoringEngine,
    queues: ClassQueueSet,
    history: HistoryLedger,
}

impl Scheduler {
    /// Scheduler with default weights, class scores, and fairness rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler assembled from pre-configured components.
    #[must_use]
    pub const fn from_parts(engine: ScoringEngine, queues: ClassQueueSet) -> Self {
        Self {
            engine,
            queues,
            history: HistoryLedger::new(),
        }
    }

    /// Set the three scoring weights. Rejected unless all are non-negative
    /// and they sum to 1.0 (within epsilon); the scoring engine itself does
    /// not re-validate.
    pub fn set_weights(&mut self, urgency: f64, wait: f64, class: f64) -> Result<(), TriageError> {
        let sum = urgency + wait + class;
        if urgency < 0.0 || wait < 0.0 || class < 0.0 || (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(TriageError::InvalidWeights(sum));
        }
        self.engine.set_weights(Weights {
            urgency,
            wait,
            class,
        });
        tracing::info!(urgency, wait, class, "scoring weights updated");
        Ok(())
    }

    /// Set a class's base score. Any float is accepted.
    pub fn set_class_score(&mut self, class: ServiceClass, score: f64) {
        self.engine.set_class_score(class, score);
        tracing::info!(%class, score, "class base score updated");
    }

    /// Set the fairness rules. Both values must be positive.
    pub fn set_fairness(
        &mut self,
        max_wait_minutes: u32,
        boost_multiplier: f64,
    ) -> Result<(), TriageError> {
        if max_wait_minutes == 0 || boost_multiplier <= 0.0 {
            return Err(TriageError::InvalidFairness);
        }
        self.queues.set_fairness(FairnessParams {
            max_wait_minutes,
            boost_multiplier,
        });
        tracing::info!(max_wait_minutes, boost_multiplier, "fairness rules updated");
        Ok(())
    }

    /// Admit a patient arriving at `now`. Re-admission of an id already
    /// queued updates the existing entry instead of duplicating it.
    pub fn admit(&mut self, id: PatientId, urgency: u8, class: ServiceClass, now: Timestamp) {
        let patient = Patient::new(id, urgency, class, now);
        self.queues.admit(patient, now, &self.engine);
    }

    /// Admit with an explicit arrival timestamp; the event-feed entry point.
    pub fn admit_at(
        &mut self,
        id: PatientId,
        urgency: u8,
        class: ServiceClass,
        timestamp: Timestamp,
    ) {
        self.admit(id, urgency, class, timestamp);
    }

    /// Dispatch the highest-priority patient, recording the service in the
    /// ledger with `now` as the service time. `None` when all queues are
    /// empty.
    pub fn dispatch_next(&mut self, now: Timestamp) -> Option<ServiceRecord> {
        let patient = self.queues.dispatch_next(now)?;
        let record = ServiceRecord::from_dispatched(&patient);
        self.history.record(record.clone());
        Some(record)
    }

    /// Dispatch a specific patient by id, recording the service in the
    /// ledger. `None` when no queue holds `id`.
    pub fn dispatch_by_id(&mut self, id: PatientId, now: Timestamp) -> Option<ServiceRecord> {
        let patient = self.queues.dispatch_by_id(id, now)?;
        let record = ServiceRecord::from_dispatched(&patient);
        self.history.record(record.clone());
        Some(record)
    }

    /// Re-score every queued patient at `now`, applying the fairness boost
    /// and rebuilding all heaps. Intended to be driven by a periodic caller
    /// tick; nothing in the engine re-scores spontaneously.
    pub fn rescore(&mut self, now: Timestamp) {
        self.queues.rescore_all(now, &self.engine);
    }

    /// Per-class queue counts.
    #[must_use]
    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            counts: self.queues.class_counts(),
        }
    }

    /// The service-history ledger.
    #[must_use]
    pub const fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Read access to the queue set (visit counts, membership checks).
    #[must_use]
    pub const fn queues(&self) -> &ClassQueueSet {
        &self.queues
    }

    /// Read access to the scoring engine.
    #[must_use]
    pub const fn engine(&self) -> &ScoringEngine {
        &self.engine
    }
}

/// Clonable handle treating the scheduler as a single critical section.
///
/// Redistribution and re-scoring touch multiple class queues atomically, so
/// concurrent callers must never observe a partially-moved state. One writer
/// lock around the whole facade is the supported adaptation; each operation
/// is a bounded, synchronous computation, so hold times stay short.
#[derive(Debug, Clone, Default)]
pub struct SharedScheduler {
    inner: Arc<Mutex<Scheduler>>,
}

impl SharedScheduler {
    /// Wrap a scheduler for shared use.
    #[must_use]
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    /// Lock the scheduler for one or more operations. Keep the guard only
    /// as long as the operation sequence that must appear atomic.
    pub fn lock(&self) -> MutexGuard<'_, Scheduler> {
        self.inner.lock()
    }
}
