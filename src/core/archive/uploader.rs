//! Destination probe and fixed-delay upload retry

use crate::adapters::storage::ArchiveStorage;
use crate::config::UploadConfig;
use crate::domain::artifact::ArchiveArtifact;
use crate::domain::errors::{delay_ms, ErrorClass, UploadError};
use crate::domain::ids::{DestinationId, RemoteId};
use std::sync::Arc;
use std::time::Duration;

/// Upload retry policy: a fixed delay between a small number of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Total attempts, first one included
    pub max_attempts: u32,

    /// Delay between attempts
    pub delay: Duration,
}

impl UploadPolicy {
    /// Creates a policy
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Builds the policy from the `[upload]` section
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.delay_ms))
    }

    /// Policy that retries without waiting
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}

/// Pushes artifacts to an [`ArchiveStorage`]
pub struct ArchiveUploader {
    storage: Arc<dyn ArchiveStorage>,
    policy: UploadPolicy,
    convert: bool,
}

impl ArchiveUploader {
    /// Creates an uploader
    ///
    /// `convert` asks the storage to convert artifacts to its spreadsheet
    /// format.
    pub fn new(storage: Arc<dyn ArchiveStorage>, policy: UploadPolicy, convert: bool) -> Self {
        Self {
            storage,
            policy,
            convert,
        }
    }

    /// Confirms the destination exists before any work is done
    ///
    /// Runs a single attempt. A missing destination and a failed probe both
    /// mean the run cannot archive anything.
    pub async fn probe_destination(&self, destination: &DestinationId) -> Result<(), UploadError> {
        match self.storage.folder_exists(destination).await {
            Ok(true) => {
                tracing::debug!(destination = %destination, "Destination is reachable");
                Ok(())
            }
            Ok(false) => Err(UploadError::DestinationUnreachable {
                destination: destination.to_string(),
                reason: "folder does not exist".to_string(),
            }),
            Err(err) => Err(UploadError::DestinationUnreachable {
                destination: destination.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Uploads one artifact, retrying transport failures at a fixed delay
    ///
    /// Exactly one remote file exists after a successful return. Errors the
    /// storage classifies as fatal or not-found are not retried.
    pub async fn upload(
        &self,
        artifact: &ArchiveArtifact,
        destination: &DestinationId,
    ) -> Result<RemoteId, UploadError> {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::info!(
                artifact = artifact.name(),
                destination = %destination,
                size_bytes = artifact.size(),
                attempt,
                max_attempts,
                "Uploading artifact"
            );

            let err = match self
                .storage
                .create_file(artifact, destination, self.convert)
                .await
            {
                Ok(remote_id) => {
                    tracing::info!(
                        artifact = artifact.name(),
                        remote_id = %remote_id,
                        attempt,
                        "Artifact uploaded"
                    );
                    return Ok(remote_id);
                }
                Err(err) => err,
            };

            if matches!(err.class, ErrorClass::Fatal | ErrorClass::NotFound) {
                tracing::error!(
                    artifact = artifact.name(),
                    attempt,
                    cause = %err.class,
                    error = %err,
                    "Upload rejected"
                );
                return Err(UploadError::Rejected {
                    artifact: artifact.name().to_string(),
                    cause: err,
                });
            }

            if attempt >= max_attempts {
                tracing::error!(
                    artifact = artifact.name(),
                    attempt,
                    max_attempts,
                    cause = %err.class,
                    error = %err,
                    "Upload failed on final attempt"
                );
                return Err(UploadError::RetriesExhausted {
                    artifact: artifact.name().to_string(),
                    attempts: attempt,
                    last: err,
                });
            }

            tracing::warn!(
                artifact = artifact.name(),
                attempt,
                max_attempts,
                delay_ms = delay_ms(self.policy.delay),
                cause = %err.class,
                error = %err,
                "Retrying upload after error"
            );
            tokio::time::sleep(self.policy.delay).await;
        }
    }
}
