//! Reporting helpers over history snapshots.
//!
//! The ledger returns records in ledger order; these helpers sort and
//! summarize them for report surfaces.

use std::cmp::Ordering;

use crate::core::history::ServiceRecord;
use crate::core::patient::ServiceClass;

/// Sort key for report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Order by arrival (entry) time.
    ArrivalTime,
    /// Order by total waiting time in minutes.
    WaitingTime,
    /// Order by final priority score.
    PriorityScore,
}

/// Sort direction for report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Sort records in place by the given key and direction. Stable, so ties
/// keep ledger order.
pub fn sort_records(records: &mut [ServiceRecord], sort_by: SortBy, order: SortOrder) {
    records.sort_by(|a, b| {
        let cmp = match sort_by {
            SortBy::ArrivalTime => a.arrival_time.cmp(&b.arrival_time),
            SortBy::WaitingTime => a.total_wait_minutes().cmp(&b.total_wait_minutes()),
            SortBy::PriorityScore => a
                .priority_score
                .partial_cmp(&b.priority_score)
                .unwrap_or(Ordering::Equal),
        };
        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Aggregate statistics over a record subset.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    /// Number of records in the subset.
    pub total_served: usize,
    /// Mean wait in whole minutes, 0.0 for an empty subset.
    pub average_wait_minutes: f64,
    /// Served count per class label, in `ServiceClass::ALL` order.
    pub served_per_class: [usize; ServiceClass::COUNT],
}

/// Summarize a record subset: totals, mean wait, per-class breakdown.
#[must_use]
pub fn summarize(records: &[ServiceRecord]) -> ReportSummary {
    let mut served_per_class = [0; ServiceClass::COUNT];
    let mut total_wait = 0i64;
    for record in records {
        served_per_class[record.service_class.rank()] += 1;
        total_wait += record.total_wait_minutes();
    }
    let average_wait_minutes = if records.is_empty() {
        0.0
    } else {
        total_wait as f64 / records.len() as f64
    };
    ReportSummary {
        total_served: records.len(),
        average_wait_minutes,
        served_per_class,
    }
}

/// Render a minute count as `"1h 5m"` or `"45m"`.
#[must_use]
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}
