//! Archival of finished report artifacts

pub mod uploader;

pub use uploader::{ArchiveUploader, UploadPolicy};
