//! Per-kind listing, detail fetching and row building

use crate::adapters::directory::{
    AutoForwarding, DirectoryService, DrivePermission, GroupMember, GroupSettings,
};
use crate::core::collect::CollectedRecord;
use crate::core::fetch::{FetchOutcome, Paginator, RetryingFetcher};
use crate::core::report::schema::{drive_acl, forwarding, membership};
use crate::core::report::{ReportKind, GROUP_SETTINGS_FIELDS};
use crate::domain::errors::{ApiError, PaginationError};
use crate::domain::records::{ReportRow, ResourceRef};
use std::sync::Arc;

/// Detail payload of one listed resource
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRecord {
    /// Every permission of a shared drive, in listing order
    Permissions(Vec<DrivePermission>),

    /// A user's auto-forwarding setting
    Forwarding(AutoForwarding),

    /// Every member of a group, in listing order
    Members(Vec<GroupMember>),

    /// A group's settings
    Settings(GroupSettings),
}

/// Reads one report kind from the directory
///
/// Directory calls retry under the directory policy; Gmail settings calls
/// have their own, more patient policy.
#[derive(Clone)]
pub struct ReportSource {
    kind: ReportKind,
    directory: Arc<dyn DirectoryService>,
    directory_fetcher: RetryingFetcher,
    mail_fetcher: RetryingFetcher,
    max_pages: usize,
}

impl ReportSource {
    /// Creates a source
    pub fn new(
        kind: ReportKind,
        directory: Arc<dyn DirectoryService>,
        directory_fetcher: RetryingFetcher,
        mail_fetcher: RetryingFetcher,
        max_pages: usize,
    ) -> Self {
        Self {
            kind,
            directory,
            directory_fetcher,
            mail_fetcher,
            max_pages,
        }
    }

    /// The report kind
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    fn paginator(&self) -> Paginator {
        Paginator::new(self.directory_fetcher.clone(), self.max_pages)
    }

    /// Lists every top-level resource of the report
    pub async fn list(&self) -> Result<Vec<ResourceRef>, PaginationError> {
        let directory = self.directory.as_ref();
        let paginator = self.paginator();

        match self.kind {
            ReportKind::SharedDriveAcls => {
                paginator
                    .collect_all("drives.list", move |cursor| {
                        directory.list_shared_drives(cursor)
                    })
                    .await
            }
            ReportKind::UserForwarding => {
                paginator
                    .collect_all("users.list", move |cursor| directory.list_users(cursor))
                    .await
            }
            ReportKind::GroupMembers | ReportKind::GroupSettings => {
                paginator
                    .collect_all("groups.list", move |cursor| directory.list_groups(cursor))
                    .await
            }
        }
    }

    /// Fetches the detail of one resource
    pub async fn fetch_detail(&self, resource: ResourceRef) -> FetchOutcome<DetailRecord> {
        let directory = self.directory.as_ref();
        let id = &resource.id;

        match self.kind {
            ReportKind::SharedDriveAcls => {
                let listing = self
                    .paginator()
                    .collect_all("permissions.list", move |cursor| {
                        directory.list_drive_permissions(id, cursor)
                    })
                    .await;
                inner_listing(listing).map(DetailRecord::Permissions)
            }
            ReportKind::UserForwarding => self
                .mail_fetcher
                .call("gmail.settings.getAutoForwarding", || {
                    directory.get_auto_forwarding(id)
                })
                .await
                .map(DetailRecord::Forwarding),
            ReportKind::GroupMembers => {
                let listing = self
                    .paginator()
                    .collect_all("members.list", move |cursor| {
                        directory.list_group_members(id, cursor)
                    })
                    .await;
                inner_listing(listing).map(DetailRecord::Members)
            }
            ReportKind::GroupSettings => self
                .directory_fetcher
                .call("groupsSettings.get", || directory.get_group_settings(id))
                .await
                .map(DetailRecord::Settings),
        }
    }
}

/// Folds the result of a per-resource listing into a fetch outcome
///
/// A resource whose first page is not found has no data. Any other listing
/// failure skips the resource, since a partial list would misreport it.
fn inner_listing<T>(listing: Result<Vec<T>, PaginationError>) -> FetchOutcome<Vec<T>> {
    match listing {
        Ok(items) => FetchOutcome::Ok(items),
        Err(PaginationError::Missing { page: 0 }) => FetchOutcome::Missing,
        Err(PaginationError::Fetch { source, .. }) => source.into(),
        Err(other) => FetchOutcome::Fatal(ApiError::fatal(other.to_string())),
    }
}

/// Flattens one collected record into report rows
///
/// Resources without data, drives without permissions, groups without
/// members and users without forwarding all yield no rows. Absent names
/// and forwarding targets are left out of the row and render as the
/// placeholder.
pub fn rows_for(record: &CollectedRecord<DetailRecord>) -> Vec<ReportRow> {
    let resource = &record.resource;
    let Some(detail) = &record.detail else {
        return Vec::new();
    };

    match detail {
        DetailRecord::Permissions(permissions) => permissions
            .iter()
            .map(|p| {
                ReportRow::new()
                    .with_opt(drive_acl::DRIVE_NAME, resource.name())
                    .with(drive_acl::DRIVE_ID, resource.id.as_str())
                    .with_opt(drive_acl::EMAIL, p.email_address.as_deref())
                    .with_opt(drive_acl::ROLE, p.role.as_deref())
                    .with_opt(drive_acl::TYPE, p.kind.as_deref())
                    .with_opt(drive_acl::DISPLAY_NAME, p.display_name.as_deref())
            })
            .collect(),
        DetailRecord::Forwarding(settings) if settings.is_forwarding() => vec![ReportRow::new()
            .with(forwarding::PRIMARY_EMAIL, resource.id.as_str())
            .with_opt(forwarding::FULL_NAME, resource.name())
            .with_opt(forwarding::FORWARD_TO, settings.active_target())
            .with_opt(forwarding::DISPOSITION, settings.disposition.as_deref())],
        DetailRecord::Forwarding(_) => Vec::new(),
        DetailRecord::Members(members) => members
            .iter()
            .map(|m| {
                ReportRow::new()
                    .with(membership::GROUP_EMAIL, resource.id.as_str())
                    .with_opt(membership::MEMBER_EMAIL, m.email.as_deref())
                    .with_opt(membership::ROLE, m.role.as_deref())
                    .with_opt(membership::STATUS, m.status.as_deref())
            })
            .collect(),
        DetailRecord::Settings(settings) => {
            let row = GROUP_SETTINGS_FIELDS
                .iter()
                .fold(ReportRow::new(), |row, field| {
                    row.with_opt(*field, settings.field(field))
                });
            vec![row]
        }
    }
}
