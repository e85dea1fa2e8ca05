//! Domain error types
//!
//! This module defines the error hierarchy for gwarchive. Remote failures are
//! reduced to a transport-neutral [`ApiError`] carrying an [`ErrorClass`], so the
//! retry layer can branch on the class instead of on HTTP client types.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Main gwarchive error type
///
/// This is the primary error type used throughout the library. Per-resource
/// failures never surface as an `ArchiveError`; they are absorbed by the
/// record collector and show up only as skip counters.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Credential or token exchange errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Top-level resource listing failed, the run cannot continue
    #[error("Listing failed: {0}")]
    Listing(#[from] PaginationError),

    /// Destination probe or upload failed
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Classification of a remote failure
///
/// Drives the retry decision: rate-limited and transient failures are
/// retried with backoff, fatal failures propagate immediately, not-found
/// is "no data" and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Quota or rate limit hit (HTTP 429, Google `rateLimitExceeded`)
    RateLimited,
    /// Service unavailable, 5xx, connection reset, timeout
    TransientService,
    /// Permission denied, bad request and every other non-retryable failure
    Fatal,
    /// The resource has no data (HTTP 404 and soft equivalents)
    NotFound,
}

impl ErrorClass {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => ErrorClass::RateLimited,
            404 => ErrorClass::NotFound,
            500..=599 => ErrorClass::TransientService,
            408 => ErrorClass::TransientService,
            _ => ErrorClass::Fatal,
        }
    }

    /// Whether a failure of this class should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorClass::RateLimited | ErrorClass::TransientService)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::RateLimited => "rate_limited",
            ErrorClass::TransientService => "transient_service",
            ErrorClass::Fatal => "fatal",
            ErrorClass::NotFound => "not_found",
        };
        f.write_str(name)
    }
}

/// A classified failure of a single remote call
///
/// Adapters build these from HTTP responses or transport errors; they never
/// expose `reqwest` types past the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Retry classification
    pub class: ErrorClass,
    /// HTTP status, if the failure came from a response
    pub status: Option<u16>,
    /// Human readable detail
    pub message: String,
}

impl ApiError {
    /// Creates an error with an explicit class
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            status: None,
            message: message.into(),
        }
    }

    /// Creates an error from an HTTP status, classified by status alone
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            class: ErrorClass::from_status(status),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Transport failure (connect, TLS, reset, timeout)
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::TransientService, message)
    }

    /// Rate-limited failure
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::RateLimited, message)
    }

    /// Non-retryable failure
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Fatal, message)
    }

    /// Soft "no data" failure
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, message)
    }

    /// Overrides the class, keeping status and message
    pub fn with_class(mut self, class: ErrorClass) -> Self {
        self.class = class;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status}): {}", self.class, self.message),
            None => write!(f, "{} (status none): {}", self.class, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Terminal failure of a retried call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Every attempt failed with a retryable error
    #[error("gave up after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: ApiError },

    /// A non-retryable error, raised on the attempt that hit it
    #[error("fatal error: {0}")]
    Fatal(ApiError),
}

impl FetchError {
    /// The underlying classified error
    pub fn cause(&self) -> &ApiError {
        match self {
            FetchError::RetriesExhausted { last, .. } => last,
            FetchError::Fatal(e) => e,
        }
    }
}

/// Failure of a paginated listing
///
/// A page cannot be skipped because the cursor for the next page comes from
/// the failed one, so any of these ends the listing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// The listing endpoint reported "not found" for a page
    #[error("page {page} not found")]
    Missing { page: usize },

    /// A page fetch failed after exhausting retries or hit a fatal error
    #[error("page {page} failed: {source}")]
    Fetch { page: usize, source: FetchError },

    /// The server handed back the cursor it was just given
    #[error("cursor did not advance after page {page}")]
    StalledCursor { page: usize },

    /// More pages than the configured guard allows
    #[error("listing exceeded {limit} pages")]
    TooManyPages { limit: usize },
}

/// Destination probe and upload failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// The destination folder does not exist or is not accessible
    #[error("destination {destination} is unreachable: {reason}")]
    DestinationUnreachable { destination: String, reason: String },

    /// Transient transport failures on every attempt
    #[error("upload of {artifact} failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        artifact: String,
        attempts: u32,
        last: ApiError,
    },

    /// The storage service refused the artifact
    #[error("upload of {artifact} rejected: {cause}")]
    Rejected { artifact: String, cause: ApiError },
}

/// Delay description used in retry log lines
pub(crate) fn delay_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

// Conversion from std::io::Error
impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        ArchiveError::Serialization(err.to_string())
    }
}

// Conversion from csv::Error
impl From<csv::Error> for ArchiveError {
    fn from(err: csv::Error) -> Self {
        ArchiveError::Csv(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ArchiveError {
    fn from(err: toml::de::Error) -> Self {
        ArchiveError::Configuration(format!("TOML parse error: {err}"))
    }
}
