//! Logging and observability
//!
//! gwarchive logs through `tracing` with structured fields:
//! - Human-readable console output on stderr
//! - Configurable log levels, overridable with `RUST_LOG`
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use gwarchive::logging::init_logging;
//! use gwarchive::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(report = "group-members", "Starting export");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
