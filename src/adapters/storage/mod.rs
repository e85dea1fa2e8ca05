//! Artifact storage
//!
//! - [`traits`] - the [`ArchiveStorage`] seam
//! - [`drive`] - [`DriveStorage`], archiving into a Drive folder

pub mod drive;
pub mod traits;

pub use drive::DriveStorage;
pub use traits::ArchiveStorage;
