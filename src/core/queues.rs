//! Class-partitioned queue set.
//!
//! One binary max-heap per service class, ordered by priority score, plus a
//! global id index for O(1) existence checks. Patients live in a single
//! arena keyed by id; the heaps and index hold only ids, so "update in
//! place" during re-scoring is unambiguous.
//!
//! Redistribution policy: a higher-priority class must never sit with a
//! literally empty counter while a lower class has waiting patients. When
//! that happens the *entire* lower queue moves up and the heap is rebuilt
//! once; the check cascades until no class satisfies the condition. Moved
//! patients keep their score and their original class label.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::patient::{Patient, PatientId, ServiceClass, Timestamp};
use crate::core::scoring::ScoringEngine;

/// Aging parameters applied during the periodic re-score pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessParams {
    /// Wait threshold in minutes beyond which the boost kicks in.
    pub max_wait_minutes: u32,
    /// Score added per minute waited beyond the threshold.
    pub boost_multiplier: f64,
}

impl Default for FairnessParams {
    fn default() -> Self {
        Self {
            max_wait_minutes: 25,
            boost_multiplier: 0.5,
        }
    }
}

/// Score lookup for heap ordering. Ids in a heap always resolve; a missing
/// entry sorts last rather than panicking.
fn score_of(arena: &HashMap<PatientId, Patient>, id: PatientId) -> f64 {
    arena.get(&id).map_or(f64::NEG_INFINITY, |p| p.priority_score)
}

/// Standard binary-heap insertion repair: swap with the parent while the
/// child's score is greater. Returns the final index.
fn sift_up(heap: &mut [PatientId], arena: &HashMap<PatientId, Patient>, mut idx: usize) -> usize {
    while idx > 0 {
        let parent = (idx - 1) / 2;
        if score_of(arena, heap[idx]) <= score_of(arena, heap[parent]) {
            break;
        }
        heap.swap(idx, parent);
        idx = parent;
    }
    idx
}

/// Push the entry at `idx` down until both children score no higher.
/// Returns the final index.
fn sift_down(heap: &mut [PatientId], arena: &HashMap<PatientId, Patient>, mut idx: usize) -> usize {
    let len = heap.len();
    loop {
        let left = 2 * idx + 1;
        let right = 2 * idx + 2;
        let mut largest = idx;

        if left < len && score_of(arena, heap[left]) > score_of(arena, heap[largest]) {
            largest = left;
        }
        if right < len && score_of(arena, heap[right]) > score_of(arena, heap[largest]) {
            largest = right;
        }
        if largest == idx {
            return idx;
        }
        heap.swap(idx, largest);
        idx = largest;
    }
}

/// Rebuild the heap in place (Floyd's heapify), O(n).
fn rebuild(heap: &mut [PatientId], arena: &HashMap<PatientId, Patient>) {
    let len = heap.len();
    for idx in (0..len / 2).rev() {
        sift_down(heap, arena, idx);
    }
}

/// Max-priority queues partitioned by service class, with cascading
/// redistribution and visit-count tracking across re-admissions.
#[derive(Debug, Default)]
pub struct ClassQueueSet {
    /// Arena of active patients keyed by id; doubles as the id index.
    patients: HashMap<PatientId, Patient>,
    /// One id-heap per class, in `ServiceClass::ALL` order.
    heaps: [Vec<PatientId>; ServiceClass::COUNT],
    /// Which queue currently holds an id. Diverges from the patient's class
    /// label after redistribution.
    index: HashMap<PatientId, ServiceClass>,
    /// Total admissions per id, surviving dispatches and re-admissions.
    visit_counts: HashMap<PatientId, u32>,
    fairness: FairnessParams,
}

impl ClassQueueSet {
    /// Empty queue set with the given fairness parameters.
    #[must_use]
    pub fn new(fairness: FairnessParams) -> Self {
        Self {
            fairness,
            ..Self::default()
        }
    }

    /// Replace the fairness parameters used by the next re-score pass.
    pub fn set_fairness(&mut self, fairness: FairnessParams) {
        self.fairness = fairness;
    }

    /// Current fairness parameters.
    #[must_use]
    pub const fn fairness(&self) -> FairnessParams {
        self.fairness
    }

    /// Total patients across all queues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    /// Whether every queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Whether `id` is currently queued.
    #[must_use]
    pub fn contains(&self, id: PatientId) -> bool {
        self.index.contains_key(&id)
    }

    /// Total admissions recorded for `id`, including past dispatches.
    #[must_use]
    pub fn visit_count(&self, id: PatientId) -> u32 {
        self.visit_counts.get(&id).copied().unwrap_or(0)
    }

    /// Ids admitted at least `threshold` times.
    #[must_use]
    pub fn frequent_visitors(&self, threshold: u32) -> Vec<PatientId> {
        self.visit_counts
            .iter()
            .filter(|&(_, &count)| count >= threshold)
            .map(|(&id, _)| id)
            .collect()
    }

    /// Queue length per class, in `ServiceClass::ALL` order. Counts reflect
    /// queue membership, not class labels, so redistributed patients show up
    /// under the queue that now holds them.
    #[must_use]
    pub fn class_counts(&self) -> [usize; ServiceClass::COUNT] {
        let mut counts = [0; ServiceClass::COUNT];
        for (class, heap) in ServiceClass::ALL.iter().zip(&self.heaps) {
            counts[class.rank()] = heap.len();
        }
        counts
    }

    /// Admit a patient: score it, insert into its class heap, and record the
    /// visit. The score is computed with the visit count *before* this
    /// admission; the counter increments afterwards.
    ///
    /// Admitting an id that is already queued is treated as an update: the
    /// existing entry is re-scored in place (with the incremented visit
    /// count), locally re-heapified, and the incoming record is discarded.
    /// No duplicate entry is ever created.
    pub fn admit(&mut self, mut patient: Patient, now: Timestamp, engine: &ScoringEngine) {
        let id = patient.id;

        if self.contains(id) {
            self.readmit(id, now, engine);
            return;
        }

        let prior_visits = self.visit_count(id);
        patient.priority_score = engine.score(&patient, now, prior_visits);
        patient.visit_count = prior_visits + 1;
        self.visit_counts.insert(id, prior_visits + 1);

        let class = patient.service_class;
        tracing::info!(
            id,
            class = %class,
            score = patient.priority_score,
            "patient admitted"
        );

        self.patients.insert(id, patient);
        self.index.insert(id, class);
        let heap = &mut self.heaps[class.rank()];
        heap.push(id);
        let last = heap.len() - 1;
        sift_up(heap, &self.patients, last);
    }

    /// Update path for an admission of an already-active id.
    fn readmit(&mut self, id: PatientId, now: Timestamp, engine: &ScoringEngine) {
        let visits = self.visit_count(id) + 1;
        self.visit_counts.insert(id, visits);

        let Some(patient) = self.patients.get_mut(&id) else {
            return;
        };
        patient.visit_count = visits;
        patient.priority_score = engine.score(patient, now, visits);
        let score = patient.priority_score;

        let Some(&class) = self.index.get(&id) else {
            return;
        };
        let heap = &mut self.heaps[class.rank()];
        if let Some(pos) = heap.iter().position(|&entry| entry == id) {
            let pos = sift_up(heap, &self.patients, pos);
            sift_down(heap, &self.patients, pos);
        }

        tracing::info!(id, visits, score, "re-admission updated in place");
    }

    /// Dispatch the highest-scored patient of the first non-empty class in
    /// precedence order. Returns `None` when every queue is empty.
    ///
    /// Redistribution runs before selection and again if the scanned queue
    /// empties, so an empty higher-priority counter is always backfilled
    /// from below before and after the pop.
    pub fn dispatch_next(&mut self, now: Timestamp) -> Option<Patient> {
        self.redistribute();

        let class = ServiceClass::ALL
            .into_iter()
            .find(|class| !self.heaps[class.rank()].is_empty())?;

        let heap = &mut self.heaps[class.rank()];
        let last = heap.len() - 1;
        heap.swap(0, last);
        let id = heap.pop()?;
        sift_down(heap, &self.patients, 0);

        let emptied = self.heaps[class.rank()].is_empty();
        self.index.remove(&id);
        let mut patient = self.patients.remove(&id)?;
        patient.service_time = Some(now);

        tracing::info!(id, queue = %class, score = patient.priority_score, "dispatched next patient");

        if emptied {
            self.redistribute();
        }
        Some(patient)
    }

    /// Dispatch a specific patient regardless of its position.
    ///
    /// Manual-override path, not the hot path: the patient is removed from
    /// an arbitrary heap position and that queue is rebuilt wholesale.
    /// Returns `None` if no queue holds `id`.
    pub fn dispatch_by_id(&mut self, id: PatientId, now: Timestamp) -> Option<Patient> {
        let class = self.index.remove(&id)?;
        let heap = &mut self.heaps[class.rank()];
        if let Some(pos) = heap.iter().position(|&entry| entry == id) {
            heap.swap_remove(pos);
        }

        let mut patient = self.patients.remove(&id)?;
        patient.service_time = Some(now);
        rebuild(&mut self.heaps[class.rank()], &self.patients);

        tracing::info!(id, queue = %class, "dispatched patient by id");
        Some(patient)
    }

    /// Move entire lower-class queues into empty higher-class queues,
    /// cascading until no class is empty above a non-empty one.
    ///
    /// Idempotent; converges in fewer iterations than there are classes.
    pub fn redistribute(&mut self) {
        loop {
            let mut moved = false;
            for rank in 0..ServiceClass::COUNT - 1 {
                if self.heaps[rank].is_empty() && !self.heaps[rank + 1].is_empty() {
                    let promoted = std::mem::take(&mut self.heaps[rank + 1]);
                    let target = ServiceClass::ALL[rank];
                    for &id in &promoted {
                        self.index.insert(id, target);
                    }
                    tracing::info!(
                        from = %ServiceClass::ALL[rank + 1],
                        to = %target,
                        count = promoted.len(),
                        "queue empty, redirecting lower class upward"
                    );
                    self.heaps[rank] = promoted;
                    rebuild(&mut self.heaps[rank], &self.patients);
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }
    }

    /// Recompute every queued patient's score at `now`, stack the fairness
    /// boost on top where the wait exceeds the threshold, then rebuild every
    /// heap (individual deltas can invalidate heap order anywhere).
    pub fn rescore_all(&mut self, now: Timestamp, engine: &ScoringEngine) {
        let max_wait = i64::from(self.fairness.max_wait_minutes);

        for heap in &self.heaps {
            for &id in heap {
                let visits = self.visit_counts.get(&id).copied().unwrap_or(0);
                let Some(patient) = self.patients.get_mut(&id) else {
                    continue;
                };
                let mut score = engine.score(patient, now, visits);

                let waited = patient.wait_minutes(now);
                if waited > max_wait {
                    score += (waited - max_wait) as f64 * self.fairness.boost_multiplier;
                }
                patient.priority_score = score;
            }
        }

        for heap in &mut self.heaps {
            rebuild(heap, &self.patients);
        }
        tracing::debug!(total = self.patients.len(), "re-scored all queues");
    }

    /// Asserts the max-heap invariant on every class queue.
    #[cfg(test)]
    pub(crate) fn assert_heap_invariant(&self) {
        for (class, heap) in ServiceClass::ALL.iter().zip(&self.heaps) {
            for idx in 0..heap.len() {
                for child in [2 * idx + 1, 2 * idx + 2] {
                    if child < heap.len() {
                        assert!(
                            score_of(&self.patients, heap[idx])
                                >= score_of(&self.patients, heap[child]),
                            "heap order violated in {class} queue at index {idx}"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_set() -> (ClassQueueSet, ScoringEngine) {
        (ClassQueueSet::new(FairnessParams::default()), ScoringEngine::new())
    }

    fn admit(
        set: &mut ClassQueueSet,
        engine: &ScoringEngine,
        id: PatientId,
        urgency: u8,
        class: ServiceClass,
        now: Timestamp,
    ) {
        set.admit(Patient::new(id, urgency, class, now), now, engine);
    }

    #[test]
    fn test_heap_invariant_under_churn() {
        let (mut set, engine) = queue_set();
        for id in 0..40 {
            let class = ServiceClass::ALL[(id % 3) as usize];
            admit(&mut set, &engine, id, (id % 5 + 1) as u8, class, i64::from(id) * 30);
            set.assert_heap_invariant();
        }
        set.rescore_all(4000, &engine);
        set.assert_heap_invariant();
        while set.dispatch_next(5000).is_some() {
            set.assert_heap_invariant();
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_class_order_dominates_score() {
        let (mut set, engine) = queue_set();
        // The Checkup patient has waited far longer and carries the higher
        // raw score, but Emergency is served first regardless.
        admit(&mut set, &engine, 1, 1, ServiceClass::Emergency, 1000);
        set.admit(Patient::new(2, 5, ServiceClass::Checkup, 0), 1000, &engine);

        let first = set.dispatch_next(1060).expect("patient available");
        assert_eq!(first.id, 1);
        let second = set.dispatch_next(1120).expect("patient available");
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_intra_class_order_by_score() {
        let (mut set, engine) = queue_set();
        admit(&mut set, &engine, 1, 2, ServiceClass::Critical, 0);
        admit(&mut set, &engine, 2, 5, ServiceClass::Critical, 0);
        admit(&mut set, &engine, 3, 3, ServiceClass::Critical, 0);

        assert_eq!(set.dispatch_next(10).map(|p| p.id), Some(2));
        assert_eq!(set.dispatch_next(20).map(|p| p.id), Some(3));
        assert_eq!(set.dispatch_next(30).map(|p| p.id), Some(1));
    }

    #[test]
    fn test_redistribution_cascades_to_emergency() {
        let (mut set, engine) = queue_set();
        admit(&mut set, &engine, 10, 2, ServiceClass::Checkup, 0);
        admit(&mut set, &engine, 11, 4, ServiceClass::Checkup, 0);

        // Emergency and Critical are empty, so dispatch backfills the
        // emergency counter from the checkup queue and serves from there.
        let served = set.dispatch_next(60).expect("patient available");
        assert_eq!(served.id, 11);
        // The class label survives the move; only queue membership changed.
        assert_eq!(served.service_class, ServiceClass::Checkup);

        let counts = set.class_counts();
        assert_eq!(counts[ServiceClass::Emergency.rank()], 1);
        assert_eq!(counts[ServiceClass::Critical.rank()], 0);
        assert_eq!(counts[ServiceClass::Checkup.rank()], 0);
    }

    #[test]
    fn test_single_checkup_served_when_others_empty() {
        let (mut set, engine) = queue_set();
        admit(&mut set, &engine, 7, 1, ServiceClass::Checkup, 0);
        let served = set.dispatch_next(30).expect("patient available");
        assert_eq!(served.id, 7);
        assert!(set.dispatch_next(31).is_none());
    }

    #[test]
    fn test_redistribute_is_idempotent() {
        let (mut set, engine) = queue_set();
        admit(&mut set, &engine, 1, 3, ServiceClass::Checkup, 0);
        set.redistribute();
        let counts = set.class_counts();
        set.redistribute();
        assert_eq!(set.class_counts(), counts);
        assert_eq!(counts[ServiceClass::Emergency.rank()], 1);
    }

    #[test]
    fn test_readmission_keeps_single_entry() {
        let (mut set, engine) = queue_set();
        admit(&mut set, &engine, 7, 3, ServiceClass::Critical, 0);
        admit(&mut set, &engine, 7, 3, ServiceClass::Critical, 600);

        assert_eq!(set.len(), 1);
        assert_eq!(set.visit_count(7), 2);
        set.assert_heap_invariant();

        let served = set.dispatch_next(600).expect("patient available");
        assert_eq!(served.id, 7);
        assert_eq!(served.visit_count, 2);
        // The surviving score is the second admission's: 600s of wait moved
        // the score well above the first admission's.
        let expected = engine.score(&Patient::new(7, 3, ServiceClass::Critical, 0), 600, 2);
        assert!((served.priority_score - expected).abs() < 1e-9);
        assert!(set.dispatch_next(601).is_none());
    }

    #[test]
    fn test_dispatch_by_id_found_and_missing() {
        let (mut set, engine) = queue_set();
        admit(&mut set, &engine, 1, 5, ServiceClass::Emergency, 0);
        admit(&mut set, &engine, 2, 3, ServiceClass::Emergency, 0);
        admit(&mut set, &engine, 3, 1, ServiceClass::Emergency, 0);

        let served = set.dispatch_by_id(2, 100).expect("id 2 queued");
        assert_eq!(served.id, 2);
        assert_eq!(served.service_time, Some(100));
        assert!(!set.contains(2));
        set.assert_heap_invariant();

        assert!(set.dispatch_by_id(99, 101).is_none());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_rescore_applies_fairness_boost() {
        let (mut set, engine) = queue_set();
        set.set_fairness(FairnessParams {
            max_wait_minutes: 25,
            boost_multiplier: 0.5,
        });

        let now = 40 * 60;
        // Arrived 40 minutes ago.
        set.admit(Patient::new(1, 2, ServiceClass::Checkup, 0), 0, &engine);
        set.rescore_all(now, &engine);

        let served = set.dispatch_next(now).expect("patient available");
        let base = engine.score(&Patient::new(1, 2, ServiceClass::Checkup, 0), now, 1);
        let boost = (40.0 - 25.0) * 0.5;
        assert!((served.priority_score - (base + boost)).abs() < 1e-9);
    }

    #[test]
    fn test_rescore_under_threshold_adds_nothing() {
        let (mut set, engine) = queue_set();
        let now = 10 * 60;
        set.admit(Patient::new(1, 2, ServiceClass::Checkup, 0), 0, &engine);
        set.rescore_all(now, &engine);

        let served = set.dispatch_next(now).expect("patient available");
        let base = engine.score(&Patient::new(1, 2, ServiceClass::Checkup, 0), now, 1);
        assert!((served.priority_score - base).abs() < 1e-9);
    }

    #[test]
    fn test_frequent_visitors() {
        let (mut set, engine) = queue_set();
        for round in 0..6 {
            admit(&mut set, &engine, 42, 1, ServiceClass::Checkup, round * 100);
            set.dispatch_next(round * 100 + 50);
        }
        admit(&mut set, &engine, 43, 1, ServiceClass::Checkup, 0);

        assert_eq!(set.visit_count(42), 6);
        assert_eq!(set.frequent_visitors(5), vec![42]);
    }

    #[test]
    fn test_dispatch_empty_returns_none() {
        let (mut set, _) = queue_set();
        assert!(set.dispatch_next(0).is_none());
    }
}
