//! Export command implementation
//!
//! This module implements the `export` command, which runs one report and
//! archives it into the configured Drive folder.

use super::exit_code;
use crate::config::load_config;
use crate::core::export::{ExportJob, ExportSummary, JobState};
use crate::core::report::ReportKind;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Report to export
    #[arg(value_enum)]
    pub kind: ReportKind,

    /// Write the CSV locally without probing the destination or uploading
    #[arg(long)]
    pub dry_run: bool,

    /// Override the directory the CSV file is written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Override the destination folder id
    #[arg(long, value_name = "ID")]
    pub folder_id: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(report = %self.kind, "Starting export command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(dir) = &self.output_dir {
            tracing::info!(output_dir = %dir, "Overriding output directory from CLI");
            config.export.output_dir = dir.clone();
        }
        if let Some(folder_id) = &self.folder_id {
            tracing::info!(folder_id = %folder_id, "Overriding destination folder from CLI");
            config.destination.folder_id = folder_id.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - The report will be written locally but not uploaded");
            println!();
        }

        let mut job = match ExportJob::from_config(&config, self.kind) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize export");
                eprintln!("Failed to initialize export: {e}");
                return Ok(exit_code(&e));
            }
        };

        println!("🚀 Exporting {}...", self.kind);
        println!();

        let outcome = tokio::select! {
            result = job.run() => Some(result),
            _ = wait_for_shutdown(&mut shutdown_signal) => None,
        };
        let Some(result) = outcome else {
            let state = job.state();
            tracing::warn!(report = %self.kind, state = %state, "Export interrupted");
            eprintln!("{}", interrupted_message(state));
            return Ok(5);
        };

        match result {
            Ok(summary) => {
                print_summary(&summary);
                Ok(0)
            }
            Err(e) => {
                eprintln!("Export failed: {e}");
                Ok(exit_code(&e))
            }
        }
    }
}

/// What an interrupted run left at the destination
fn interrupted_message(state: JobState) -> &'static str {
    if state == JobState::Uploading {
        "Export interrupted during upload; the artifact may already exist in the destination folder"
    } else {
        "Export interrupted before upload; nothing was archived"
    }
}

async fn wait_for_shutdown(signal: &mut watch::Receiver<bool>) {
    while !*signal.borrow() {
        if signal.changed().await.is_err() {
            // Sender gone: no shutdown can arrive any more
            std::future::pending::<()>().await;
        }
    }
}

fn print_summary(summary: &ExportSummary) {
    println!("📊 Export Summary:");
    println!("  Report: {} (schema v{})", summary.kind, summary.schema_version);
    println!("  Resources Listed: {}", summary.stats.listed);
    println!("  With Data: {}", summary.stats.with_data);
    println!("  No Data: {}", summary.stats.missing);
    println!("  Skipped: {}", summary.stats.skipped);
    println!("  Duplicates Skipped: {}", summary.stats.duplicates_skipped);
    println!("  Rows Written: {}", summary.rows_written);
    println!("  Artifact: {}", summary.artifact_path.display());
    println!("  Size: {} bytes", summary.artifact_size);
    println!("  SHA-256: {}", summary.artifact_sha256);
    match &summary.remote_id {
        Some(id) => println!("  Archived As: {id}"),
        None => println!("  Archived As: (dry run, not uploaded)"),
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if summary.has_skips() {
        println!(
            "⚠️  {} resource(s) were skipped after failed fetches; see the log for details",
            summary.stats.skipped
        );
    } else {
        println!("✅ Export completed");
    }
}
