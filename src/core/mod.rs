//! Core scheduling engine: records, scoring, class queues, history, facade.

pub mod error;
pub mod patient;
pub mod scoring;
pub mod queues;
pub mod history;
pub mod report;
pub mod scheduler;

pub use error::{AppResult, TriageError};
pub use patient::{Patient, PatientId, ServiceClass, Timestamp};
pub use scoring::{ScoringEngine, Weights};
pub use queues::{ClassQueueSet, FairnessParams};
pub use history::{HistoryLedger, ServiceRecord};
pub use report::{format_duration, sort_records, summarize, ReportSummary, SortBy, SortOrder};
pub use scheduler::{QueueStatus, Scheduler, SharedScheduler};
