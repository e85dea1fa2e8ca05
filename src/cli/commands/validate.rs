//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the gwarchive configuration file.

use crate::config::{load_config, GwArchiveConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

fn credential_kind(config: &GwArchiveConfig) -> &'static str {
    let workspace = &config.workspace;
    if workspace.access_token.is_some() {
        "static access token"
    } else if workspace.service_account_json.is_some() {
        "service account (inline JSON)"
    } else {
        "service account (key file)"
    }
}

fn print_summary(config: &GwArchiveConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!("  Admin: {}", config.workspace.admin_email);
    println!("  Customer: {}", config.workspace.customer_id);
    println!("  Credentials: {}", credential_kind(config));
    println!("  Destination Folder: {}", config.destination.folder_id);
    println!("  Convert To Sheets: {}", config.destination.convert_to_sheets);
    println!("  Output Directory: {}", config.export.output_dir);
    println!("  Page Size: {}", config.export.page_size);
    println!("  Detail Concurrency: {}", config.export.detail_concurrency);
    println!(
        "  Directory Retry: {} attempts",
        config.retry.directory.max_attempts
    );
    println!(
        "  Mail Settings Retry: {} attempts",
        config.retry.mail_settings.max_attempts
    );
    println!(
        "  Upload Retry: {} attempts, {} ms apart",
        config.upload.max_attempts, config.upload.delay_ms
    );
    println!();
}
