//! Export orchestration
//!
//! - [`job`] - the [`ExportJob`] state machine composing one run
//! - [`reports`] - what each [`crate::core::report::ReportKind`] lists, fetches and writes
//! - [`summary`] - the per-run [`ExportSummary`]

pub mod job;
pub mod reports;
pub mod summary;

pub use job::{ExportJob, JobOptions, JobState};
pub use reports::{rows_for, DetailRecord, ReportSource};
pub use summary::ExportSummary;
