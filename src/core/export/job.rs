//! Export job state machine
//!
//! ```text
//! Init -> Listing -> Collecting -> Writing -> Uploading -> Done
//!   |        |                                    |
//!   +--------+----------------> Failed <----------+
//! ```
//!
//! Per-resource failures during `Collecting` are absorbed by the collector,
//! so a job whose listing succeeded always reaches `Writing`.

use super::reports::{rows_for, ReportSource};
use super::summary::ExportSummary;
use crate::adapters::auth::Session;
use crate::adapters::directory::{DirectoryService, WorkspaceClient};
use crate::adapters::storage::{ArchiveStorage, DriveStorage};
use crate::config::GwArchiveConfig;
use crate::core::archive::{ArchiveUploader, UploadPolicy};
use crate::core::collect::RecordCollector;
use crate::core::fetch::{RetryPolicy, RetryingFetcher};
use crate::core::report::{ReportKind, TabularWriter};
use crate::domain::artifact::ArtifactName;
use crate::domain::errors::ArchiveError;
use crate::domain::ids::DestinationId;
use crate::domain::result::Result;
use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle of one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Init,
    Listing,
    Collecting,
    Writing,
    Uploading,
    Done,
    Failed,
}

impl JobState {
    /// Whether the job can leave this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }

    fn as_str(&self) -> &'static str {
        match self {
            JobState::Init => "init",
            JobState::Listing => "listing",
            JobState::Collecting => "collecting",
            JobState::Writing => "writing",
            JobState::Uploading => "uploading",
            JobState::Done => "done",
            JobState::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run parameters of an [`ExportJob`]
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Directory the artifact is written to
    pub output_dir: PathBuf,

    /// Folder the artifact is archived into
    pub destination: DestinationId,

    /// Skip the destination probe and the upload
    pub dry_run: bool,

    /// Detail fetches in flight at once
    pub detail_concurrency: usize,

    /// Page guard for every listing
    pub max_pages: usize,

    /// Retry policy of directory, drive and group settings calls
    pub directory_retry: RetryPolicy,

    /// Retry policy of Gmail settings calls
    pub mail_retry: RetryPolicy,

    /// Upload retry policy
    pub upload_policy: UploadPolicy,

    /// Convert the archived artifact to a spreadsheet
    pub convert_to_sheets: bool,
}

impl JobOptions {
    /// Builds the options from a validated configuration
    pub fn from_config(config: &GwArchiveConfig) -> Result<Self> {
        let destination = DestinationId::new(config.destination.folder_id.clone())
            .map_err(ArchiveError::Configuration)?;

        Ok(Self {
            output_dir: PathBuf::from(&config.export.output_dir),
            destination,
            dry_run: config.application.dry_run,
            detail_concurrency: config.export.detail_concurrency,
            max_pages: config.export.max_pages,
            directory_retry: RetryPolicy::from_config(&config.retry.directory),
            mail_retry: RetryPolicy::from_config(&config.retry.mail_settings),
            upload_policy: UploadPolicy::from_config(&config.upload),
            convert_to_sheets: config.destination.convert_to_sheets,
        })
    }
}

/// One export run of one report kind
pub struct ExportJob {
    kind: ReportKind,
    source: ReportSource,
    collector: RecordCollector,
    uploader: ArchiveUploader,
    options: JobOptions,
    state: JobState,
    transitions: Vec<JobState>,
}

impl ExportJob {
    /// Creates a job over explicit directory and storage implementations
    pub fn new(
        kind: ReportKind,
        directory: Arc<dyn DirectoryService>,
        storage: Arc<dyn ArchiveStorage>,
        options: JobOptions,
    ) -> Self {
        let source = ReportSource::new(
            kind,
            directory,
            RetryingFetcher::new(options.directory_retry.clone()),
            RetryingFetcher::new(options.mail_retry.clone()),
            options.max_pages,
        );
        let uploader =
            ArchiveUploader::new(storage, options.upload_policy, options.convert_to_sheets);

        Self {
            kind,
            source,
            collector: RecordCollector::new(options.detail_concurrency),
            uploader,
            options,
            state: JobState::Init,
            transitions: vec![JobState::Init],
        }
    }

    /// Creates a job talking to the Workspace APIs
    ///
    /// The session is built once here and shared by every call of the run.
    pub fn from_config(config: &GwArchiveConfig, kind: ReportKind) -> Result<Self> {
        let session = Session::from_config(&config.workspace, kind)?;
        let directory = Arc::new(WorkspaceClient::new(
            session.clone(),
            config.workspace.customer_id.clone(),
            config.export.page_size,
        ));
        let storage = Arc::new(DriveStorage::new(session));

        Ok(Self::new(
            kind,
            directory,
            storage,
            JobOptions::from_config(config)?,
        ))
    }

    /// Current state
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Every state the job has been in, in order
    pub fn transitions(&self) -> &[JobState] {
        &self.transitions
    }

    fn transition(&mut self, next: JobState) {
        tracing::info!(
            report = %self.kind,
            from = %self.state,
            to = %next,
            "Job state transition"
        );
        self.state = next;
        self.transitions.push(next);
    }

    fn fail(&mut self, error: &ArchiveError) {
        tracing::error!(
            report = %self.kind,
            state = %self.state,
            error = %error,
            "Export job failed"
        );
        self.transition(JobState::Failed);
    }

    /// Runs the job to completion
    ///
    /// Returns the run summary once the job is `Done`. Any error leaves the
    /// job `Failed`; no artifact is uploaded in that case.
    pub async fn run(&mut self) -> Result<ExportSummary> {
        if self.state != JobState::Init {
            return Err(ArchiveError::Other(format!(
                "export job already ran and ended in state {}",
                self.state
            )));
        }
        let started = Instant::now();
        tracing::info!(
            report = %self.kind,
            destination = %self.options.destination,
            dry_run = self.options.dry_run,
            "Starting export"
        );

        match self.execute().await {
            Ok(summary) => {
                let summary = summary.with_duration(started.elapsed());
                summary.log_summary();
                Ok(summary)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    async fn execute(&mut self) -> Result<ExportSummary> {
        if self.options.dry_run {
            tracing::info!("Dry run, skipping destination probe");
        } else {
            self.uploader
                .probe_destination(&self.options.destination)
                .await?;
        }

        self.transition(JobState::Listing);
        let resources = self.source.list().await?;
        tracing::info!(
            report = %self.kind,
            resources = resources.len(),
            "Listing finished"
        );

        self.transition(JobState::Collecting);
        let name = ArtifactName::new(self.kind.file_prefix(), &Local::now());
        let mut writer = TabularWriter::create(&self.options.output_dir, name, self.kind.schema())?;
        let source = &self.source;
        let stats = self
            .collector
            .collect(
                resources,
                move |resource| source.fetch_detail(resource),
                |record| writer.write_rows(&rows_for(&record)),
            )
            .await?;

        self.transition(JobState::Writing);
        let artifact = writer.finish()?;
        tracing::info!(
            artifact = artifact.name(),
            path = %artifact.path().display(),
            rows = artifact.rows(),
            "Report written"
        );

        let remote_id = if self.options.dry_run {
            tracing::info!(
                artifact = artifact.name(),
                "Dry run, keeping artifact local"
            );
            None
        } else {
            self.transition(JobState::Uploading);
            Some(
                self.uploader
                    .upload(&artifact, &self.options.destination)
                    .await?,
            )
        };

        self.transition(JobState::Done);
        Ok(ExportSummary::new(
            self.kind,
            stats,
            &artifact,
            remote_id,
            self.state,
            self.options.dry_run,
        ))
    }
}
