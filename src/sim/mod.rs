//! Event-ingestion boundary: ordered arrival-event logs and replay.

pub mod events;

pub use events::{ArrivalEvent, EventLog};
