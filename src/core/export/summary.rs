//! Export summary and reporting
//!
//! One [`ExportSummary`] is produced per successful run. It is logged when
//! the run ends and printed by the `export` command.

use super::job::JobState;
use crate::core::collect::CollectionStats;
use crate::core::report::ReportKind;
use crate::domain::artifact::ArchiveArtifact;
use crate::domain::ids::RemoteId;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of one export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Report that was exported
    pub kind: ReportKind,

    /// Column schema version of the artifact
    pub schema_version: u32,

    /// Collection counters
    pub stats: CollectionStats,

    /// Data rows written, header excluded
    pub rows_written: u64,

    /// Artifact file name
    pub artifact_name: String,

    /// Local path of the artifact
    pub artifact_path: PathBuf,

    /// Artifact size in bytes
    pub artifact_size: usize,

    /// Hex SHA-256 of the artifact content
    pub artifact_sha256: String,

    /// Remote id of the archived artifact, `None` on dry runs
    pub remote_id: Option<RemoteId>,

    /// State the job ended in
    pub final_state: JobState,

    /// Whether the run skipped archival
    pub dry_run: bool,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl ExportSummary {
    /// Builds the summary of a run that produced `artifact`
    pub fn new(
        kind: ReportKind,
        stats: CollectionStats,
        artifact: &ArchiveArtifact,
        remote_id: Option<RemoteId>,
        final_state: JobState,
        dry_run: bool,
    ) -> Self {
        Self {
            kind,
            schema_version: kind.schema().version,
            stats,
            rows_written: artifact.rows(),
            artifact_name: artifact.name().to_string(),
            artifact_path: artifact.path().to_path_buf(),
            artifact_size: artifact.size(),
            artifact_sha256: artifact.sha256(),
            remote_id,
            final_state,
            dry_run,
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether any listed resource was dropped
    pub fn has_skips(&self) -> bool {
        self.stats.skipped > 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            report = %self.kind,
            schema_version = self.schema_version,
            listed = self.stats.listed,
            with_data = self.stats.with_data,
            missing = self.stats.missing,
            skipped = self.stats.skipped,
            duplicates_skipped = self.stats.duplicates_skipped,
            rows = self.rows_written,
            artifact = %self.artifact_name,
            size_bytes = self.artifact_size,
            sha256 = %self.artifact_sha256,
            remote_id = self.remote_id.as_ref().map(RemoteId::as_str).unwrap_or("none"),
            state = %self.final_state,
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            "Export completed"
        );

        if self.has_skips() {
            tracing::warn!(
                report = %self.kind,
                skipped = self.stats.skipped,
                "Export completed with skipped resources"
            );
        }
    }
}
