//! REST implementation of [`DirectoryService`] over the Workspace APIs

use super::models::{
    page_refs, resource_ref, AutoForwarding, DriveList, DrivePermission, GroupList, GroupMember,
    GroupSettings, MemberList, PermissionList, UserList,
};
use super::traits::DirectoryService;
use crate::adapters::auth::Session;
use crate::adapters::http::{self, endpoint};
use crate::domain::errors::{ApiError, ErrorClass};
use crate::domain::ids::ResourceId;
use crate::domain::records::{Page, PageCursor, ResourceRef};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

const MAX_DRIVES_PAGE: u32 = 100;
const MAX_PERMISSIONS_PAGE: u32 = 100;
const MAX_USERS_PAGE: u32 = 500;
const MAX_GROUPS_PAGE: u32 = 200;
const MAX_MEMBERS_PAGE: u32 = 200;

/// Gmail answers 400 for users without a mailbox
const MAIL_NOT_ENABLED: &str = "mail service not enabled";

/// Workspace API client
///
/// Directory, Drive and Groups Settings calls act as the session's
/// administrator; Gmail settings calls act as the user being read.
#[derive(Clone)]
pub struct WorkspaceClient {
    session: Session,
    customer_id: String,
    page_size: u32,
}

impl WorkspaceClient {
    /// Creates a client for one customer
    pub fn new(session: Session, customer_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            session,
            customer_id: customer_id.into(),
            page_size: page_size.max(1),
        }
    }

    fn page_size(&self, limit: u32) -> String {
        self.page_size.min(limit).to_string()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        subject: &str,
    ) -> Result<T, ApiError> {
        let token = self.session.tokens.access_token(subject).await?;
        tracing::trace!(url = %url, subject, "GET");

        let response = self
            .session
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(http::transport)?;
        let response = http::check(response).await?;
        http::json(response).await
    }

    async fn get_as_admin<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.get_json(url, query, &self.session.admin_subject).await
    }
}

fn with_cursor(
    mut query: Vec<(&'static str, String)>,
    cursor: &PageCursor,
) -> Vec<(&'static str, String)> {
    if let Some(token) = cursor.token() {
        query.push(("pageToken", token.to_string()));
    }
    query
}

#[async_trait]
impl DirectoryService for WorkspaceClient {
    async fn list_shared_drives(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError> {
        let url = endpoint(&self.session.endpoints.drive, &["drives"])?;
        let query = with_cursor(
            vec![
                ("useDomainAdminAccess", "true".to_string()),
                ("pageSize", self.page_size(MAX_DRIVES_PAGE)),
                ("fields", "nextPageToken,drives(id,name)".to_string()),
            ],
            &cursor,
        );

        let list: DriveList = self.get_as_admin(url, &query).await?;
        let (refs, next) = page_refs(list.drives, list.next_page_token, |d| {
            resource_ref(&d.id, d.name.as_deref())
        });
        Ok(Page::new(refs, next))
    }

    async fn list_drive_permissions(
        &self,
        drive: &ResourceId,
        cursor: PageCursor,
    ) -> Result<Page<DrivePermission>, ApiError> {
        let url = endpoint(
            &self.session.endpoints.drive,
            &["files", drive.as_str(), "permissions"],
        )?;
        let query = with_cursor(
            vec![
                ("supportsAllDrives", "true".to_string()),
                ("useDomainAdminAccess", "true".to_string()),
                ("pageSize", self.page_size(MAX_PERMISSIONS_PAGE)),
                (
                    "fields",
                    "nextPageToken,permissions(emailAddress,role,type,displayName)".to_string(),
                ),
            ],
            &cursor,
        );

        let list: PermissionList = self.get_as_admin(url, &query).await?;
        Ok(Page::new(
            list.permissions,
            PageCursor::from_token(list.next_page_token),
        ))
    }

    async fn list_users(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError> {
        let url = endpoint(&self.session.endpoints.directory, &["users"])?;
        let query = with_cursor(
            vec![
                ("customer", self.customer_id.clone()),
                ("maxResults", self.page_size(MAX_USERS_PAGE)),
                ("orderBy", "email".to_string()),
            ],
            &cursor,
        );

        let list: UserList = self.get_as_admin(url, &query).await?;
        let (refs, next) = page_refs(list.users, list.next_page_token, |u| {
            if u.suspended {
                tracing::debug!(user = %u.primary_email, "Skipping suspended user");
                return None;
            }
            resource_ref(&u.primary_email, u.full_name())
        });
        Ok(Page::new(refs, next))
    }

    async fn get_auto_forwarding(&self, user: &ResourceId) -> Result<AutoForwarding, ApiError> {
        let url = endpoint(
            &self.session.endpoints.gmail,
            &["users", user.as_str(), "settings", "autoForwarding"],
        )?;

        self.get_json(url, &[], user.as_str()).await.map_err(|err| {
            if err.status == Some(400) && err.message.to_lowercase().contains(MAIL_NOT_ENABLED) {
                err.with_class(ErrorClass::NotFound)
            } else {
                err
            }
        })
    }

    async fn list_groups(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError> {
        let url = endpoint(&self.session.endpoints.directory, &["groups"])?;
        let query = with_cursor(
            vec![
                ("customer", self.customer_id.clone()),
                ("maxResults", self.page_size(MAX_GROUPS_PAGE)),
            ],
            &cursor,
        );

        let list: GroupList = self.get_as_admin(url, &query).await?;
        let (refs, next) = page_refs(list.groups, list.next_page_token, |g| {
            resource_ref(&g.email, g.name.as_deref())
        });
        Ok(Page::new(refs, next))
    }

    async fn list_group_members(
        &self,
        group: &ResourceId,
        cursor: PageCursor,
    ) -> Result<Page<GroupMember>, ApiError> {
        let url = endpoint(
            &self.session.endpoints.directory,
            &["groups", group.as_str(), "members"],
        )?;
        let query = with_cursor(
            vec![("maxResults", self.page_size(MAX_MEMBERS_PAGE))],
            &cursor,
        );

        let list: MemberList = self.get_as_admin(url, &query).await?;
        Ok(Page::new(
            list.members,
            PageCursor::from_token(list.next_page_token),
        ))
    }

    async fn get_group_settings(&self, group: &ResourceId) -> Result<GroupSettings, ApiError> {
        let url = endpoint(
            &self.session.endpoints.groups_settings,
            &["groups", group.as_str()],
        )?;
        // The Groups Settings API answers in Atom unless asked otherwise
        self.get_as_admin(url, &[("alt", "json".to_string())]).await
    }
}
