//! Service-history ledger.
//!
//! Append-only record of completed dispatches. Queries are pure filters in
//! ledger order; expected scale is bounded by daily dispatch volume, so no
//! indexing structure is kept. Callers sort as needed (see [`crate::core::report`]).
//!
//! Time-range queries filter on the snapshot's **arrival** time, not its
//! service time. That is a deliberate, externally observable contract for
//! "who arrived in this window" reports and must not be silently changed.

use serde::Serialize;

use crate::core::patient::{Patient, PatientId, ServiceClass, Timestamp};

/// Immutable snapshot of a patient at the moment of dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRecord {
    /// Patient identifier. Unique while queued, not unique across history.
    pub id: PatientId,
    /// Urgency at admission.
    pub urgency: u8,
    /// Class label assigned at admission (survives redistribution).
    pub service_class: ServiceClass,
    /// Admission timestamp.
    pub arrival_time: Timestamp,
    /// Dispatch timestamp.
    pub service_time: Timestamp,
    /// Final priority score at dispatch.
    pub priority_score: f64,
    /// Admission count for this id at the time of dispatch.
    pub visit_count: u32,
}

impl ServiceRecord {
    /// Freeze a dispatched patient into a history snapshot. The patient's
    /// `service_time` must already be set by the dispatch path.
    #[must_use]
    pub fn from_dispatched(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            urgency: patient.urgency,
            service_class: patient.service_class,
            arrival_time: patient.arrival_time,
            service_time: patient.service_time.unwrap_or(patient.arrival_time),
            priority_score: patient.priority_score,
            visit_count: patient.visit_count,
        }
    }

    /// Whole minutes between arrival and service.
    #[must_use]
    pub const fn total_wait_minutes(&self) -> i64 {
        let elapsed = self.service_time - self.arrival_time;
        if elapsed < 0 {
            0
        } else {
            elapsed / 60
        }
    }
}

/// Append-only ledger of completed services.
#[derive(Debug, Default)]
pub struct HistoryLedger {
    records: Vec<ServiceRecord>,
}

impl HistoryLedger {
    /// Empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append one dispatch snapshot. There is no deletion or compaction;
    /// retention is unbounded for the lifetime of the process.
    pub fn record(&mut self, record: ServiceRecord) {
        self.records.push(record);
    }

    /// Number of recorded dispatches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been dispatched yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in ledger order.
    #[must_use]
    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    /// Records whose *arrival* time falls in `[start, end]`, inclusive.
    #[must_use]
    pub fn by_arrival_range(&self, start: Timestamp, end: Timestamp) -> Vec<ServiceRecord> {
        self.records
            .iter()
            .filter(|r| r.arrival_time >= start && r.arrival_time <= end)
            .cloned()
            .collect()
    }

    /// Records whose final score falls in `[min, max]`, inclusive.
    #[must_use]
    pub fn by_score_range(&self, min: f64, max: f64) -> Vec<ServiceRecord> {
        self.records
            .iter()
            .filter(|r| r.priority_score >= min && r.priority_score <= max)
            .cloned()
            .collect()
    }

    /// Records carrying the given class label.
    #[must_use]
    pub fn by_class(&self, class: ServiceClass) -> Vec<ServiceRecord> {
        self.records
            .iter()
            .filter(|r| r.service_class == class)
            .cloned()
            .collect()
    }

    /// Records carrying the given class label whose arrival time falls in
    /// `[start, end]`, inclusive.
    #[must_use]
    pub fn by_class_in_range(
        &self,
        class: ServiceClass,
        start: Timestamp,
        end: Timestamp,
    ) -> Vec<ServiceRecord> {
        self.records
            .iter()
            .filter(|r| {
                r.service_class == class && r.arrival_time >= start && r.arrival_time <= end
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: PatientId,
        class: ServiceClass,
        arrival: Timestamp,
        service: Timestamp,
        score: f64,
    ) -> ServiceRecord {
        ServiceRecord {
            id,
            urgency: 3,
            service_class: class,
            arrival_time: arrival,
            service_time: service,
            priority_score: score,
            visit_count: 1,
        }
    }

    fn ledger() -> HistoryLedger {
        let mut ledger = HistoryLedger::new();
        ledger.record(record(1, ServiceClass::Emergency, 100, 200, 12.0));
        ledger.record(record(2, ServiceClass::Critical, 300, 350, 8.5));
        ledger.record(record(3, ServiceClass::Checkup, 500, 900, 4.0));
        ledger
    }

    #[test]
    fn test_arrival_window_not_service_window() {
        let ledger = ledger();
        // id=3 arrived at 500, served at 900. The arrival window finds it;
        // the same bounds around its service time do not.
        let hits = ledger.by_arrival_range(499, 501);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 3);

        let around_service = ledger.by_arrival_range(899, 901);
        assert!(around_service.is_empty());
    }

    #[test]
    fn test_arrival_range_is_inclusive() {
        let ledger = ledger();
        let hits = ledger.by_arrival_range(100, 300);
        assert_eq!(hits.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_score_range() {
        let ledger = ledger();
        let hits = ledger.by_score_range(5.0, 10.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn test_by_class_with_and_without_window() {
        let ledger = ledger();
        assert_eq!(ledger.by_class(ServiceClass::Checkup).len(), 1);
        assert!(ledger
            .by_class_in_range(ServiceClass::Checkup, 0, 400)
            .is_empty());
        assert_eq!(
            ledger
                .by_class_in_range(ServiceClass::Checkup, 400, 600)
                .len(),
            1
        );
    }

    #[test]
    fn test_ledger_order_preserved() {
        let ledger = ledger();
        let ids: Vec<_> = ledger.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_total_wait_minutes() {
        let r = record(1, ServiceClass::Emergency, 0, 40 * 60, 1.0);
        assert_eq!(r.total_wait_minutes(), 40);
    }
}
