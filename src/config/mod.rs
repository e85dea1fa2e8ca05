//! Configuration management for gwarchive.
//!
//! TOML configuration with `${VAR_NAME}` environment substitution,
//! `GWARCHIVE_<SECTION>_<KEY>` overrides, defaults for every optional
//! setting and validation on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gwarchive::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("gwarchive.toml")?;
//!
//! println!("Acting as: {}", config.workspace.admin_email);
//! println!("Destination folder: {}", config.destination.folder_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry-run switch
//! - [`WorkspaceConfig`] - acting admin, customer, credentials, API endpoints
//! - [`DestinationConfig`] - Drive folder receiving the artifacts
//! - [`ExportConfig`] - scratch directory, page size, detail concurrency
//! - [`RetrySection`] - one [`RetryConfig`] per call class
//! - [`UploadConfig`] - fixed-delay upload retry
//! - [`LoggingConfig`] - JSON log file settings
//!
//! # Example Configuration
//!
//! ```toml
//! [workspace]
//! admin_email = "admin@example.com"
//! service_account_json = "${GOOGLE_SERVICE_ACCOUNT_JSON}"
//!
//! [destination]
//! folder_id = "${GWARCHIVE_FOLDER_ID}"
//!
//! [retry.mail_settings]
//! max_attempts = 5
//! rate_limit_delay_ms = 30000
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DestinationConfig, ExportConfig, GwArchiveConfig, LoggingConfig,
    RetryConfig, RetrySection, UploadConfig, WorkspaceConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
