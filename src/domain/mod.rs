//! Domain types for gwarchive.
//!
//! This module holds the vocabulary shared by every layer: the error
//! taxonomy, identifier newtypes, the records that flow through an export
//! run and the artifact a run produces.
//!
//! # Overview
//!
//! - **Identifiers** ([`ResourceId`], [`DestinationId`], [`RemoteId`])
//! - **Records** ([`ResourceRef`], [`PageCursor`], [`Page`], [`ReportRow`])
//! - **Artifact** ([`ArchiveArtifact`], [`ArtifactName`])
//! - **Errors** ([`ArchiveError`], [`ApiError`], [`ErrorClass`], [`FetchError`],
//!   [`PaginationError`], [`UploadError`])
//! - **Result alias** ([`Result`])
//!
//! # Error Handling
//!
//! Remote failures are classified once, at the adapter boundary:
//!
//! ```rust
//! use gwarchive::domain::{ApiError, ErrorClass};
//!
//! let err = ApiError::from_status(429, "quota exceeded");
//! assert_eq!(err.class, ErrorClass::RateLimited);
//! assert!(err.class.is_retryable());
//! ```

pub mod artifact;
pub mod context;
pub mod errors;
pub mod ids;
pub mod records;
pub mod result;

pub use artifact::{ArchiveArtifact, ArtifactName};
pub use errors::{ApiError, ArchiveError, ErrorClass, FetchError, PaginationError, UploadError};
pub use ids::{DestinationId, RemoteId, ResourceId};
pub use records::{Page, PageCursor, ReportRow, ResourceRef};
pub use result::Result;
