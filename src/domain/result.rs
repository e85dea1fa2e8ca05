//! Result type alias for gwarchive

use super::errors::ArchiveError;

/// Result type alias for gwarchive operations
///
/// # Examples
///
/// ```
/// use gwarchive::domain::result::Result;
/// use gwarchive::domain::errors::ArchiveError;
///
/// fn present(value: &str) -> Result<&str> {
///     if value.is_empty() {
///         return Err(ArchiveError::Configuration("value is empty".to_string()));
///     }
///     Ok(value)
/// }
/// ```
pub type Result<T> = std::result::Result<T, ArchiveError>;
