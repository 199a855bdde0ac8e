//! Core domain logic for the timekeeper.
//!
//! This crate contains the decision logic of the tool:
//! - Interval engine: whether a tick opens, closes, resumes, or discards a
//!   work interval
//! - Report formatting: work and break aggregation and its textual rendering
//!
//! Persistence and the wall clock are collaborators behind the [`EntryStore`]
//! and [`Clock`] traits; this crate performs no I/O of its own.

pub mod clock;
pub mod duration;
pub mod engine;
pub mod interval;
pub mod report;
pub mod store;

pub use clock::Clock;
pub use duration::{NegativeDuration, format_duration, format_elapsed};
pub use engine::{Engine, EngineConfig, EngineError, TickOutcome};
pub use interval::Interval;
pub use report::{DayStatus, WorkBreakSummary, render_outcome, render_status, render_summary};
pub use store::EntryStore;
