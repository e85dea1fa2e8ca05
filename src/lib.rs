// gwarchive - Google Workspace Admin Report Archiver
// Copyright (c) 2025 gwarchive Contributors
// Licensed under the MIT License

//! # gwarchive - Google Workspace admin report archiver
//!
//! gwarchive exports administrative data from a Google Workspace tenant
//! into CSV reports and archives each report into a Drive folder.
//!
//! ## Overview
//!
//! Every report follows the same pipeline:
//! - **Listing** top-level resources (shared drives, users, groups) page by page
//! - **Collecting** each resource's detail with bounded, class-aware retry
//! - **Writing** rows to a timestamped CSV file with a fixed column schema
//! - **Uploading** the file to the destination folder with fixed-delay retry
//!
//! A resource whose detail cannot be fetched is skipped and counted; it
//! never fails the run. Listing and upload failures do.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export engine (fetch, collect, report, archive, export)
//! - [`adapters`] - Google API integrations behind traits
//! - [`domain`] - Error taxonomy, identifiers, records and artifacts
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gwarchive::config::load_config;
//! use gwarchive::core::export::ExportJob;
//! use gwarchive::core::report::ReportKind;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("gwarchive.toml")?;
//!
//!     let mut job = ExportJob::from_config(&config, ReportKind::SharedDriveAcls)?;
//!     let summary = job.run().await?;
//!
//!     println!("Archived {} rows as {:?}", summary.rows_written, summary.remote_id);
//!     Ok(())
//! }
//! ```
//!
//! ## Retry
//!
//! Remote failures are classified once, in the adapters, and every retry
//! decision branches on that class:
//!
//! ```rust
//! use gwarchive::core::fetch::{FetchOutcome, RetryPolicy, RetryingFetcher};
//! use gwarchive::domain::errors::ApiError;
//!
//! # async fn example() {
//! let fetcher = RetryingFetcher::new(RetryPolicy::immediate(3));
//! let outcome: FetchOutcome<u32> = fetcher
//!     .call("groups.get", || async { Err(ApiError::not_found("no such group")) })
//!     .await;
//! assert_eq!(outcome, FetchOutcome::Missing);
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], whose error type is
//! [`domain::ArchiveError`]:
//!
//! ```rust,no_run
//! use gwarchive::domain::ArchiveError;
//!
//! fn example() -> Result<(), ArchiveError> {
//!     let config = gwarchive::config::load_config("gwarchive.toml")?;
//!     println!("{}", config.destination.folder_id);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
