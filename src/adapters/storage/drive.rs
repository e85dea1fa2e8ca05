//! Drive folder storage
//!
//! Artifacts are created with a single `multipart/related` upload: a JSON
//! metadata part naming the file and its parent folder, followed by the CSV
//! bytes.

use super::traits::ArchiveStorage;
use crate::adapters::auth::Session;
use crate::adapters::http::{self, endpoint};
use crate::domain::artifact::ArchiveArtifact;
use crate::domain::errors::{ApiError, ErrorClass};
use crate::domain::ids::{DestinationId, RemoteId};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const SHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Metadata part of a multipart upload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'static str>,
}

/// `files.get` response, limited to the probed fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FolderInfo {
    #[serde(default)]
    trashed: bool,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Archives artifacts into a Drive folder, shared drives included
#[derive(Clone)]
pub struct DriveStorage {
    session: Session,
}

impl DriveStorage {
    /// Creates a storage acting as the session's administrator
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

/// Assembles a `multipart/related` body and returns it with its boundary
fn multipart_body(metadata: &[u8], content_type: &str, content: &[u8]) -> (String, Vec<u8>) {
    let boundary = format!("gwarchive-{}", uuid::Uuid::new_v4().simple());

    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (boundary, body)
}

#[async_trait]
impl ArchiveStorage for DriveStorage {
    async fn folder_exists(&self, destination: &DestinationId) -> Result<bool, ApiError> {
        let url = endpoint(&self.session.endpoints.drive, &["files", destination.as_str()])?;
        let token = self.session.admin_token().await?;

        let response = self
            .session
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("supportsAllDrives", "true"),
                ("fields", "id,trashed,mimeType"),
            ])
            .send()
            .await
            .map_err(http::transport)?;

        let info: FolderInfo = match http::check(response).await {
            Ok(response) => http::json(response).await?,
            Err(err) if err.class == ErrorClass::NotFound => {
                tracing::debug!(folder = %destination, "Destination folder not found");
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        if info.trashed {
            tracing::warn!(folder = %destination, "Destination folder is in the trash");
            return Ok(false);
        }
        if info.mime_type.as_deref() != Some(FOLDER_MIME_TYPE) {
            tracing::warn!(
                folder = %destination,
                mime_type = info.mime_type.as_deref().unwrap_or("unknown"),
                "Destination is not a folder"
            );
            return Ok(false);
        }
        Ok(true)
    }

    async fn create_file(
        &self,
        artifact: &ArchiveArtifact,
        destination: &DestinationId,
        convert: bool,
    ) -> Result<RemoteId, ApiError> {
        let url = endpoint(&self.session.endpoints.upload, &["files"])?;
        let metadata = FileMetadata {
            name: artifact.name(),
            parents: [destination.as_str()],
            mime_type: convert.then_some(SHEET_MIME_TYPE),
        };
        let metadata = serde_json::to_vec(&metadata)
            .map_err(|e| ApiError::fatal(format!("failed to encode file metadata: {e}")))?;
        let (boundary, body) =
            multipart_body(&metadata, artifact.content_type(), artifact.content());

        let token = self.session.admin_token().await?;
        let response = self
            .session
            .http
            .post(url)
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", "id"),
            ])
            .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body)
            .send()
            .await
            .map_err(http::transport)?;

        let created: CreatedFile = http::json(http::check(response).await?).await?;
        Ok(RemoteId::new(created.id))
    }
}
