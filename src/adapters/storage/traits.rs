//! Archive storage abstraction

use crate::domain::artifact::ArchiveArtifact;
use crate::domain::errors::ApiError;
use crate::domain::ids::{DestinationId, RemoteId};
use async_trait::async_trait;

/// Remote location report artifacts are archived into
///
/// Like [`crate::adapters::directory::DirectoryService`], each call is a
/// single request; [`crate::core::archive::ArchiveUploader`] owns retrying.
#[async_trait]
pub trait ArchiveStorage: Send + Sync {
    /// Whether the destination exists and can receive artifacts
    ///
    /// A destination that does not exist is `Ok(false)`, not an error.
    async fn folder_exists(&self, destination: &DestinationId) -> Result<bool, ApiError>;

    /// Creates the artifact under the destination and returns its remote id
    ///
    /// When `convert` is set the storage may convert the artifact to its
    /// native spreadsheet format.
    async fn create_file(
        &self,
        artifact: &ArchiveArtifact,
        destination: &DestinationId,
        convert: bool,
    ) -> Result<RemoteId, ApiError>;
}
