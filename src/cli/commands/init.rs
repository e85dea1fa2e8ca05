//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "gwarchive.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing gwarchive configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - Set GOOGLE_SERVICE_ACCOUNT_JSON to the service account key");
                println!("     - Set GWARCHIVE_FOLDER_ID to the destination Drive folder");
                println!("  3. Validate configuration: gwarchive validate-config");
                println!("  4. Run an export: gwarchive export group-members");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Sample configuration with every setting and its default
    fn generate_config() -> String {
        r#"# gwarchive Configuration File
# Google Workspace admin report archiver
#
# Values of the form ${VAR} are read from the environment (or a .env file).
# Any setting can also be overridden with GWARCHIVE_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run: write the CSV locally, skip the destination probe and upload
dry_run = false

# ============================================================================
# Google Workspace
# ============================================================================
[workspace]
# Super admin impersonated through domain-wide delegation
admin_email = "admin@example.com"

# Customer whose users and groups are listed
customer_id = "my_customer"

# Service account key (exactly one credential source must be set)
service_account_json = "${GOOGLE_SERVICE_ACCOUNT_JSON}"
# service_account_file = "/etc/gwarchive/service-account.json"
# access_token = "${GOOGLE_ACCESS_TOKEN}"

# HTTP request timeout in seconds
timeout_seconds = 60

# ============================================================================
# Archive Destination
# ============================================================================
[destination]
# Drive folder (shared drives supported) that receives the reports
folder_id = "${GWARCHIVE_FOLDER_ID}"

# Convert uploaded CSV files to Google Sheets
convert_to_sheets = false

# ============================================================================
# Export Settings
# ============================================================================
[export]
# Scratch directory for the CSV file
output_dir = "."

# Page size requested from listing endpoints (1-500)
page_size = 100

# Detail fetches in flight at once (1-32); rows keep listing order
detail_concurrency = 1

# Upper bound on pages per listing
max_pages = 10000

# ============================================================================
# Retry Policies
# ============================================================================
# Directory, Drive and Groups Settings calls
[retry.directory]
max_attempts = 3
rate_limit_delay_ms = 30000
transient_delay_ms = 5000
multiplier = 2.0
max_delay_ms = 300000
jitter = 0.0

# Gmail settings calls, made once per user
[retry.mail_settings]
max_attempts = 5
rate_limit_delay_ms = 30000
transient_delay_ms = 5000
multiplier = 2.0
max_delay_ms = 300000
jitter = 0.0

# Upload of the finished report, fixed delay between attempts
[upload]
max_attempts = 3
delay_ms = 5000

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log file
local_enabled = true
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GwArchiveConfig;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_parses() {
        let text = InitArgs::generate_config()
            .replace("${GOOGLE_SERVICE_ACCOUNT_JSON}", "{}")
            .replace("${GWARCHIVE_FOLDER_ID}", "1AbCdEf");

        let config: GwArchiveConfig = toml::from_str(&text).unwrap();
        config.validate().unwrap();
        assert_eq!(config.retry.mail_settings.max_attempts, 5);
        assert_eq!(config.upload.delay_ms, 5000);
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("gwarchive.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let forced = InitArgs {
            force: true,
            ..args
        };
        assert_eq!(forced.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[workspace]"));
    }
}
