//! Core export engine for gwarchive.
//!
//! # Modules
//!
//! - [`fetch`] - Bounded retry with class-specific backoff, lazy pagination
//! - [`collect`] - Per-resource detail collection with failure isolation
//! - [`report`] - Report kinds, column schemas and the CSV writer
//! - [`archive`] - Destination probe and upload retry
//! - [`export`] - The export job state machine and run summary
//!
//! # Export Workflow
//!
//! Data flows one way through a run:
//!
//! 1. **Probe**: Confirm the destination folder exists
//! 2. **List**: Page through the top-level resources (drives, users, groups)
//! 3. **Collect**: Fetch each resource's detail, skipping failed resources
//! 4. **Write**: Stream rows into a timestamped CSV file
//! 5. **Upload**: Archive the file into the destination folder
//!
//! # Example
//!
//! ```rust,no_run
//! use gwarchive::config::load_config;
//! use gwarchive::core::export::ExportJob;
//! use gwarchive::core::report::ReportKind;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("gwarchive.toml")?;
//!
//! let mut job = ExportJob::from_config(&config, ReportKind::GroupMembers)?;
//! let summary = job.run().await?;
//!
//! println!("Rows: {}", summary.rows_written);
//! println!("Skipped: {}", summary.stats.skipped);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod collect;
pub mod export;
pub mod fetch;
pub mod report;
