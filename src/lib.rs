//! # Triage Queue
//!
//! A class-partitioned priority scheduling engine for service triage.
//!
//! Arriving entities ("patients") are admitted into one of a fixed set of
//! service classes and dispatched in priority order, where priority is a
//! weighted combination of urgency, elapsed wait time, a per-class base
//! score, and a stepped repeat-visit bonus. A periodic re-score pass applies
//! an aging boost so long-waiting entries cannot starve.
//!
//! ## Core pieces
//!
//! - **Scoring engine** ([`core::ScoringEngine`]): a pure scoring function
//!   over configurable weights and per-class base scores.
//! - **Class queue set** ([`core::ClassQueueSet`]): one binary max-heap per
//!   service class plus a global id index, with cascading redistribution so
//!   a higher-priority class never sits empty while a lower one has work.
//! - **History ledger** ([`core::HistoryLedger`]): append-only record of
//!   completed dispatches, queried by arrival window, score range, or class.
//! - **Scheduler facade** ([`core::Scheduler`]): composes the three into the
//!   operations callers use: admit, dispatch-next, dispatch-by-id, rescore,
//!   status, and the configuration boundary.
//!
//! The engine is single-threaded and synchronous: every operation runs to
//! completion, and all time values are caller-supplied so behavior stays
//! deterministic under test. For use behind multiple callers, wrap the
//! facade in [`core::SharedScheduler`], which treats each operation as one
//! critical section.
//!
//! ## Example
//!
//! ```
//! use triage_queue::core::{Scheduler, ServiceClass};
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.admit(101, 5, ServiceClass::Emergency, 0);
//! scheduler.admit(102, 2, ServiceClass::Checkup, 0);
//!
//! let served = scheduler.dispatch_next(60).expect("queue not empty");
//! assert_eq!(served.id, 101);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

/// Scheduling engine: patient records, scoring, class queues, history, facade.
pub mod core;
/// Configuration models for weights, class scores, and fairness rules.
pub mod config;
/// Builders to construct a scheduler from configuration.
pub mod builders;
/// Event-ingestion boundary: ordered arrival-event logs and replay.
pub mod sim;
/// Shared utilities.
pub mod util;
