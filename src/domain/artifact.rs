//! The file produced by one export run

use chrono::{DateTime, TimeZone};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// MIME type of every artifact the tabular writer produces
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Timestamp format embedded in artifact names
const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Timestamp-qualified artifact file name
///
/// Rendered as `<prefix>_<YYYYMMDD-HHMMSS>.csv`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use gwarchive::domain::artifact::ArtifactName;
///
/// let at = Utc.with_ymd_and_hms(2024, 9, 10, 14, 5, 9).unwrap();
/// let name = ArtifactName::new("gg_backup", &at);
/// assert_eq!(name.as_str(), "gg_backup_20240910-140509.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName(String);

impl ArtifactName {
    /// Builds the name for a report prefix and a run timestamp
    pub fn new<Tz>(prefix: &str, at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(format!(
            "{prefix}_{}.csv",
            at.format(NAME_TIMESTAMP_FORMAT)
        ))
    }

    /// Returns the file name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finished report file, ready for archival
///
/// Created once per run by the tabular writer and immutable afterwards.
#[derive(Debug, Clone)]
pub struct ArchiveArtifact {
    name: ArtifactName,
    path: PathBuf,
    content: Vec<u8>,
    content_type: &'static str,
    rows: u64,
}

impl ArchiveArtifact {
    /// Creates an artifact from a written file's bytes
    pub fn new(name: ArtifactName, path: PathBuf, content: Vec<u8>, rows: u64) -> Self {
        Self {
            name,
            path,
            content,
            content_type: CSV_CONTENT_TYPE,
            rows,
        }
    }

    /// File name used locally and at the destination
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Local scratch path the file was written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Complete file content
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Declared MIME type
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Number of data rows, header excluded
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Hex-encoded SHA-256 of the content
    pub fn sha256(&self) -> String {
        let digest = Sha256::digest(&self.content);
        format!("{digest:x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_artifact_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 8, 28, 9, 0, 0).unwrap();
        let name = ArtifactName::new("shared_drive_acls", &at);
        assert_eq!(name.as_str(), "shared_drive_acls_20240828-090000.csv");
    }

    #[test]
    fn test_artifact_accessors() {
        let at = Utc.with_ymd_and_hms(2024, 8, 28, 9, 0, 0).unwrap();
        let name = ArtifactName::new("gg_backup", &at);
        let artifact = ArchiveArtifact::new(
            name,
            PathBuf::from("/tmp/gg_backup_20240828-090000.csv"),
            b"Group Email\n".to_vec(),
            0,
        );

        assert_eq!(artifact.name(), "gg_backup_20240828-090000.csv");
        assert_eq!(artifact.content_type(), "text/csv");
        assert_eq!(artifact.size(), 12);
        assert_eq!(artifact.rows(), 0);
    }

    #[test]
    fn test_artifact_sha256() {
        let at = Utc.with_ymd_and_hms(2024, 8, 28, 9, 0, 0).unwrap();
        let artifact = ArchiveArtifact::new(
            ArtifactName::new("x", &at),
            PathBuf::from("x.csv"),
            b"abc".to_vec(),
            0,
        );
        assert_eq!(
            artifact.sha256(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
