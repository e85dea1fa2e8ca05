//! Configuration schema types
//!
//! Maps one-to-one onto the sections of `gwarchive.toml`.

use crate::config::SecretString;
use crate::domain::ids::DestinationId;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Root gwarchive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GwArchiveConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Workspace tenant, credentials and API endpoints
    pub workspace: WorkspaceConfig,

    /// Where artifacts are archived
    pub destination: DestinationConfig,

    /// Export run settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Retry policies per call class
    #[serde(default)]
    pub retry: RetrySection,

    /// Upload retry policy
    #[serde(default)]
    pub upload: UploadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GwArchiveConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value found
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.workspace.validate()?;
        self.destination.validate()?;
        self.export.validate()?;
        self.retry.directory.validate("retry.directory")?;
        self.retry.mail_settings.validate("retry.mail_settings")?;
        self.upload.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode: write the local file but skip the destination probe and upload
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Workspace tenant and credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Super-admin the service account impersonates for directory calls
    pub admin_email: String,

    /// Customer id used by user and group listings
    #[serde(default = "default_customer_id")]
    pub customer_id: String,

    /// Service account key JSON, inline (usually `${GOOGLE_SERVICE_ACCOUNT_JSON}`)
    #[serde(default)]
    pub service_account_json: Option<SecretString>,

    /// Path to a service account key file
    #[serde(default)]
    pub service_account_file: Option<String>,

    /// Pre-issued bearer token, used as-is for every subject
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// HTTP request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Admin SDK Directory API base URL
    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    /// Drive API base URL
    #[serde(default = "default_drive_url")]
    pub drive_url: String,

    /// Drive upload base URL
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Gmail API base URL
    #[serde(default = "default_gmail_url")]
    pub gmail_url: String,

    /// Groups Settings API base URL
    #[serde(default = "default_groups_settings_url")]
    pub groups_settings_url: String,
}

impl WorkspaceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.admin_email.trim().is_empty() {
            return Err("workspace.admin_email cannot be empty".to_string());
        }

        if self.customer_id.trim().is_empty() {
            return Err("workspace.customer_id cannot be empty".to_string());
        }

        let inline = self
            .service_account_json
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty());
        let file = self
            .service_account_file
            .as_ref()
            .is_some_and(|s| !s.trim().is_empty());
        let token = self
            .access_token
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty());

        match [inline, file, token].iter().filter(|set| **set).count() {
            0 => {
                return Err(
                    "One of workspace.service_account_json, workspace.service_account_file or workspace.access_token is required"
                        .to_string(),
                )
            }
            1 => {}
            _ => {
                return Err(
                    "Only one of workspace.service_account_json, workspace.service_account_file or workspace.access_token may be set"
                        .to_string(),
                )
            }
        }

        if self.timeout_seconds == 0 {
            return Err("workspace.timeout_seconds must be > 0".to_string());
        }

        for (name, url) in [
            ("directory_url", &self.directory_url),
            ("drive_url", &self.drive_url),
            ("upload_url", &self.upload_url),
            ("gmail_url", &self.gmail_url),
            ("groups_settings_url", &self.groups_settings_url),
        ] {
            if url::Url::parse(url).is_err() {
                return Err(format!("workspace.{name} is not a valid URL: '{url}'"));
            }
        }

        Ok(())
    }
}

/// Archive destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Drive folder that receives the artifacts
    pub folder_id: String,

    /// Convert uploaded CSV files to Google Sheets
    #[serde(default)]
    pub convert_to_sheets: bool,
}

impl DestinationConfig {
    fn validate(&self) -> Result<(), String> {
        DestinationId::new(self.folder_id.clone())
            .map(|_| ())
            .map_err(|_| "destination.folder_id cannot be empty".to_string())
    }
}

/// Export run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the CSV file is written to before upload
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Page size requested from listing endpoints
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Number of detail fetches in flight at once
    #[serde(default = "default_detail_concurrency")]
    pub detail_concurrency: usize,

    /// Upper bound on pages per listing
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.trim().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }

        if self.page_size == 0 || self.page_size > 500 {
            return Err(format!(
                "export.page_size must be between 1 and 500, got {}",
                self.page_size
            ));
        }

        if self.detail_concurrency == 0 || self.detail_concurrency > 32 {
            return Err(format!(
                "export.detail_concurrency must be between 1 and 32, got {}",
                self.detail_concurrency
            ));
        }

        if self.max_pages == 0 {
            return Err("export.max_pages must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            page_size: default_page_size(),
            detail_concurrency: default_detail_concurrency(),
            max_pages: default_max_pages(),
        }
    }
}

/// Retry policies per call class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySection {
    /// Directory, Drive and Groups Settings calls
    #[serde(default = "RetryConfig::directory")]
    pub directory: RetryConfig,

    /// Gmail settings calls, which hit per-user quotas much sooner
    #[serde(default = "RetryConfig::mail_settings")]
    pub mail_settings: RetryConfig,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            directory: RetryConfig::directory(),
            mail_settings: RetryConfig::mail_settings(),
        }
    }
}

/// Retry configuration for one call class
///
/// Field defaults are the directory defaults; an omitted
/// `[retry.mail_settings]` section as a whole gets the mail-settings ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, first one included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First delay after a rate-limited failure
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// First delay after a transient service failure
    #[serde(default = "default_transient_delay_ms")]
    pub transient_delay_ms: u64,

    /// Delay growth factor between attempts
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Cap on any single delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Random extra delay, as a fraction of the computed delay
    #[serde(default)]
    pub jitter: f64,
}

impl RetryConfig {
    /// Defaults for directory-class calls
    pub fn directory() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            transient_delay_ms: default_transient_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            jitter: 0.0,
        }
    }

    /// Defaults for mail-settings calls
    pub fn mail_settings() -> Self {
        Self {
            max_attempts: 5,
            ..Self::directory()
        }
    }

    fn validate(&self, section: &str) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "{section}.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }

        if self.multiplier < 1.0 {
            return Err(format!(
                "{section}.multiplier must be >= 1.0, got {}",
                self.multiplier
            ));
        }

        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(format!(
                "{section}.jitter must be between 0.0 and 1.0, got {}",
                self.jitter
            ));
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::directory()
    }
}

/// Upload retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Total upload attempts
    #[serde(default = "default_upload_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between upload attempts
    #[serde(default = "default_upload_delay_ms")]
    pub delay_ms: u64,
}

impl UploadConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "upload.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }
        Ok(())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_upload_attempts(),
            delay_ms: default_upload_delay_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable the JSON log file
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_customer_id() -> String {
    "my_customer".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_directory_url() -> String {
    "https://admin.googleapis.com/admin/directory/v1".to_string()
}

fn default_drive_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_url() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_gmail_url() -> String {
    "https://gmail.googleapis.com/gmail/v1".to_string()
}

fn default_groups_settings_url() -> String {
    "https://www.googleapis.com/groups/v1".to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_detail_concurrency() -> usize {
    1
}

fn default_max_pages() -> usize {
    10_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_rate_limit_delay_ms() -> u64 {
    30_000
}

fn default_transient_delay_ms() -> u64 {
    5_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    300_000
}

fn default_upload_attempts() -> u32 {
    3
}

fn default_upload_delay_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
