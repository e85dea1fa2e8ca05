//! Workspace directory integration
//!
//! - [`traits`] - the [`DirectoryService`] seam every report reads through
//! - [`client`] - [`WorkspaceClient`], the REST implementation
//! - [`models`] - response shapes

pub mod client;
pub mod models;
pub mod traits;

pub use client::WorkspaceClient;
pub use models::{AutoForwarding, DrivePermission, GroupMember, GroupSettings};
pub use traits::DirectoryService;
