//! CLI command implementations

pub mod export;
pub mod init;
pub mod validate;

use crate::domain::errors::{ArchiveError, UploadError};

/// Exit code for a failed command
///
/// 2 for configuration problems, 4 when the destination cannot be reached,
/// 5 for every other failure.
pub fn exit_code(error: &ArchiveError) -> i32 {
    match error {
        ArchiveError::Configuration(_) => 2,
        ArchiveError::Upload(UploadError::DestinationUnreachable { .. }) => 4,
        _ => 5,
    }
}
