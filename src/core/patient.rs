//! Patient record and service class definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-supplied patient identifier, unique among currently queued patients.
pub type PatientId = u32;

/// Caller-supplied time value in seconds. The engine never samples a wall
/// clock; minute-granularity inputs are expected and tolerated.
pub type Timestamp = i64;

/// Fixed service classes in strict dispatch precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceClass {
    /// Highest-acuity class, always served first.
    Emergency,
    /// Served when the emergency queue is empty.
    Critical,
    /// Routine visits, lowest precedence.
    Checkup,
}

impl ServiceClass {
    /// All classes in dispatch precedence order (highest acuity first).
    pub const ALL: [Self; 3] = [Self::Emergency, Self::Critical, Self::Checkup];

    /// Number of service classes.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in the precedence order; 0 is served first.
    #[must_use]
    pub const fn rank(self) -> usize {
        match self {
            Self::Emergency => 0,
            Self::Critical => 1,
            Self::Checkup => 2,
        }
    }
}

impl fmt::Display for ServiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Emergency => "Emergency",
            Self::Critical => "Critical",
            Self::Checkup => "Checkup",
        };
        f.write_str(name)
    }
}

/// One queued entity: immutable identity plus mutable priority/timing state.
///
/// `priority_score` is always the output of the last scoring call; nothing
/// else writes it. `service_time` stays `None` while queued and is set
/// exactly once at dispatch, on the frozen copy that moves to the history
/// ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Caller-supplied identifier.
    pub id: PatientId,
    /// Urgency level, a small positive integer (1..=5 at the admin surface).
    pub urgency: u8,
    /// Service class assigned at admission. Redistribution never changes it.
    pub service_class: ServiceClass,
    /// Admission timestamp.
    pub arrival_time: Timestamp,
    /// Dispatch timestamp; `None` while queued.
    pub service_time: Option<Timestamp>,
    /// Derived priority score, written only by the scoring engine.
    pub priority_score: f64,
    /// Number of admissions seen for this id, including the current one.
    pub visit_count: u32,
}

impl Patient {
    /// Create a patient record at its admission time. The score starts at
    /// zero and is filled in by the first scoring call.
    #[must_use]
    pub const fn new(
        id: PatientId,
        urgency: u8,
        service_class: ServiceClass,
        arrival_time: Timestamp,
    ) -> Self {
        Self {
            id,
            urgency,
            service_class,
            arrival_time,
            service_time: None,
            priority_score: 0.0,
            visit_count: 0,
        }
    }

    /// Seconds waited since arrival, clamped at zero.
    #[must_use]
    pub const fn wait_seconds(&self, now: Timestamp) -> i64 {
        let elapsed = now - self.arrival_time;
        if elapsed < 0 {
            0
        } else {
            elapsed
        }
    }

    /// Whole minutes waited since arrival.
    #[must_use]
    pub const fn wait_minutes(&self, now: Timestamp) -> i64 {
        self.wait_seconds(now) / 60
    }
}
