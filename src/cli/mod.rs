//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for gwarchive using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// gwarchive - Google Workspace admin report archiver
#[derive(Parser, Debug)]
#[command(name = "gwarchive")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "gwarchive.toml", env = "GWARCHIVE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GWARCHIVE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one report and archive it into the destination folder
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::ReportKind;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["gwarchive", "export", "group-members"]);
        assert_eq!(cli.config, "gwarchive.toml");
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.kind, ReportKind::GroupMembers);
                assert!(!args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_export_overrides() {
        let cli = Cli::parse_from([
            "gwarchive",
            "export",
            "shared-drive-acls",
            "--dry-run",
            "--output-dir",
            "/tmp/out",
            "--folder-id",
            "1AbC",
        ]);
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.kind, ReportKind::SharedDriveAcls);
                assert!(args.dry_run);
                assert_eq!(args.output_dir.as_deref(), Some("/tmp/out"));
                assert_eq!(args.folder_id.as_deref(), Some("1AbC"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_report() {
        assert!(Cli::try_parse_from(["gwarchive", "export", "mailboxes"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["gwarchive", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["gwarchive", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
