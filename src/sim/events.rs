//! Arrival-event logs for simulation runs.
//!
//! The loader owns the malformed-input failure domain: events are parsed and
//! validated in full before any of them reaches the scheduler, so a bad file
//! never leaves the engine in a half-fed state. The engine only ever sees
//! already-valid tuples, in ascending timestamp order.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppResult, TriageError};
use crate::core::patient::{PatientId, ServiceClass, Timestamp};
use crate::core::scheduler::Scheduler;

/// Accepted urgency range at the ingestion boundary.
const URGENCY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// One arrival: a patient appearing `timestamp` minutes after the
/// simulation epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalEvent {
    /// Minutes from the simulation epoch.
    pub timestamp: i64,
    /// Patient identifier.
    pub patient_id: PatientId,
    /// Urgency level, 1..=5.
    pub urgency: u8,
    /// Service class for this visit.
    pub service_class: ServiceClass,
}

/// An ordered sequence of arrival events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<ArrivalEvent>,
}

impl EventLog {
    /// Empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Parse a JSON array of events, validate each, and sort ascending by
    /// timestamp. Returns an error without side effects on any failure.
    pub fn from_json_str(input: &str) -> Result<Self, TriageError> {
        let mut events: Vec<ArrivalEvent> = serde_json::from_str(input)?;
        for event in &events {
            if !URGENCY_RANGE.contains(&event.urgency) {
                return Err(TriageError::InvalidUrgency(event.urgency));
            }
        }
        events.sort_by_key(|e| e.timestamp);
        tracing::info!(count = events.len(), "loaded simulation events");
        Ok(Self { events })
    }

    /// Load an event log from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot open event file {}", path.display()))?;
        let log = Self::from_json_str(&raw)
            .with_context(|| format!("malformed event file {}", path.display()))?;
        Ok(log)
    }

    /// Append one event, keeping the log sorted by timestamp.
    pub fn push(&mut self, event: ArrivalEvent) {
        self.events.push(event);
        self.events.sort_by_key(|e| e.timestamp);
    }

    /// Events in ascending timestamp order.
    #[must_use]
    pub fn events(&self) -> &[ArrivalEvent] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Feed every event into the scheduler in timestamp order, re-scoring
    /// once after each distinct timestamp batch.
    ///
    /// `epoch` anchors event minutes to the scheduler's time axis; an event
    /// at minute `m` is admitted at `epoch + m * 60`. Fully deterministic:
    /// no sleeping, no wall clock.
    pub fn replay(&self, scheduler: &mut Scheduler, epoch: Timestamp) {
        let mut index = 0;
        while index < self.events.len() {
            let minute = self.events[index].timestamp;
            let now = epoch + minute * 60;

            while index < self.events.len() && self.events[index].timestamp == minute {
                let event = self.events[index];
                tracing::info!(
                    minute,
                    id = event.patient_id,
                    urgency = event.urgency,
                    class = %event.service_class,
                    "arrival"
                );
                scheduler.admit_at(event.patient_id, event.urgency, event.service_class, now);
                index += 1;
            }

            scheduler.rescore(now);
        }
    }
}
