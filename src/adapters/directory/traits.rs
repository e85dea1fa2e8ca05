//! Directory service abstraction
//!
//! Every report reads from an implementation of [`DirectoryService`]. The
//! production implementation is [`super::WorkspaceClient`]; tests provide
//! scripted fakes.

use super::models::{AutoForwarding, DrivePermission, GroupMember, GroupSettings};
use crate::domain::errors::ApiError;
use crate::domain::ids::ResourceId;
use crate::domain::records::{Page, PageCursor, ResourceRef};
use async_trait::async_trait;

/// Listing and detail calls of the Workspace directory
///
/// Every call performs exactly one request and reports failures as a
/// classified [`ApiError`]; retrying is the caller's business.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// One page of the tenant's shared drives
    async fn list_shared_drives(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError>;

    /// One page of a shared drive's permissions
    async fn list_drive_permissions(
        &self,
        drive: &ResourceId,
        cursor: PageCursor,
    ) -> Result<Page<DrivePermission>, ApiError>;

    /// One page of non-suspended users, ordered by primary email
    ///
    /// The ref name is the user's full name.
    async fn list_users(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError>;

    /// A user's auto-forwarding setting, read as that user
    async fn get_auto_forwarding(&self, user: &ResourceId) -> Result<AutoForwarding, ApiError>;

    /// One page of the tenant's groups
    async fn list_groups(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError>;

    /// One page of a group's members
    async fn list_group_members(
        &self,
        group: &ResourceId,
        cursor: PageCursor,
    ) -> Result<Page<GroupMember>, ApiError>;

    /// A group's settings
    async fn get_group_settings(&self, group: &ResourceId) -> Result<GroupSettings, ApiError>;
}
