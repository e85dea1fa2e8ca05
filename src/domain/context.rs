//! Error context extension trait
//!
//! Adds `.context()` / `.with_context()` to any `Result` whose error converts
//! into [`ArchiveError`], so library code can annotate failures without
//! leaving the typed error.
//!
//! # Examples
//!
//! ```rust
//! use gwarchive::domain::Result;
//! use gwarchive::domain::context::ResultExt;
//!
//! fn read_sample(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::ArchiveError;
use crate::domain::result::Result;
use std::fmt::Display;

/// Extension trait for annotating errors
pub trait ResultExt<T> {
    /// Prefix the error with an eagerly built context message
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Prefix the error with a context message built only on failure
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ArchiveError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| annotate(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| annotate(e.into(), f()))
    }
}

/// Keeps the variant for the string-carrying kinds so exit-code mapping in
/// the CLI still sees a configuration or I/O failure as such.
fn annotate(err: ArchiveError, context: impl Display) -> ArchiveError {
    match err {
        ArchiveError::Configuration(msg) => ArchiveError::Configuration(format!("{context}: {msg}")),
        ArchiveError::Io(msg) => ArchiveError::Io(format!("{context}: {msg}")),
        ArchiveError::Csv(msg) => ArchiveError::Csv(format!("{context}: {msg}")),
        other => ArchiveError::Other(format!("{context}: {other}")),
    }
}
