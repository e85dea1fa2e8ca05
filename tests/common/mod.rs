//! Scripted directory and storage fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use gwarchive::adapters::auth::{Endpoints, Session, StaticToken};
use gwarchive::adapters::directory::{
    AutoForwarding, DirectoryService, DrivePermission, GroupMember, GroupSettings,
};
use gwarchive::adapters::storage::ArchiveStorage;
use gwarchive::config::secret_string;
use gwarchive::domain::{
    ApiError, ArchiveArtifact, DestinationId, Page, PageCursor, RemoteId, ResourceId, ResourceRef,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_TOKEN: &str = "ya29.test-token";
pub const ADMIN: &str = "admin@example.com";

/// Session pointing every Google endpoint at a mock server
pub fn mock_session(base_url: &str) -> Session {
    Session::new(
        reqwest::Client::new(),
        Arc::new(StaticToken::new(secret_string(TEST_TOKEN.to_string()))),
        ADMIN,
        Endpoints::all_at(base_url),
    )
}

pub fn resource(id: &str, name: &str) -> ResourceRef {
    ResourceRef::new(ResourceId::new(id).unwrap(), name)
}

/// Serves `pages` the way a cursor-paginated endpoint would
///
/// Cursors are `page-<n>`; the last page carries no cursor.
pub fn serve_page<T: Clone>(pages: &[Vec<T>], cursor: &PageCursor) -> Page<T> {
    let index = cursor
        .token()
        .and_then(|t| t.strip_prefix("page-"))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);
    let items = pages.get(index).cloned().unwrap_or_default();
    if index + 1 < pages.len() {
        Page::new(items, PageCursor::from_token(Some(format!("page-{}", index + 1))))
    } else {
        Page::last(items)
    }
}

/// In-memory directory with per-call failure scripts and call counters
///
/// Calls are keyed `drives`, `users`, `groups`, `permissions:<id>`,
/// `forwarding:<id>`, `members:<id>` and `settings:<id>`. Scripted errors
/// for a key are returned first, one per call; after that the call answers
/// from the fixture. Details without a fixture answer "not found".
#[derive(Default)]
pub struct FakeDirectory {
    drives: Vec<Vec<ResourceRef>>,
    users: Vec<Vec<ResourceRef>>,
    groups: Vec<Vec<ResourceRef>>,
    permissions: HashMap<String, Vec<DrivePermission>>,
    forwarding: HashMap<String, AutoForwarding>,
    members: HashMap<String, Vec<Vec<GroupMember>>>,
    settings: HashMap<String, GroupSettings>,
    failures: Mutex<HashMap<String, VecDeque<ApiError>>>,
    calls: Mutex<HashMap<String, u32>>,
    total: AtomicU32,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drive(mut self, id: &str, name: &str, permissions: Vec<DrivePermission>) -> Self {
        push_single(&mut self.drives, resource(id, name));
        self.permissions.insert(id.to_string(), permissions);
        self
    }

    pub fn with_user(mut self, email: &str, name: &str, forwarding: AutoForwarding) -> Self {
        push_single(&mut self.users, resource(email, name));
        self.forwarding.insert(email.to_string(), forwarding);
        self
    }

    /// Adds a user the directory has no display name for
    pub fn with_unnamed_user(mut self, email: &str, forwarding: AutoForwarding) -> Self {
        push_single(
            &mut self.users,
            ResourceRef::unnamed(ResourceId::new(email).unwrap()),
        );
        self.forwarding.insert(email.to_string(), forwarding);
        self
    }

    /// Adds a shared drive the directory has no name for
    pub fn with_unnamed_drive(mut self, id: &str, permissions: Vec<DrivePermission>) -> Self {
        push_single(
            &mut self.drives,
            ResourceRef::unnamed(ResourceId::new(id).unwrap()),
        );
        self.permissions.insert(id.to_string(), permissions);
        self
    }

    pub fn with_group_pages(mut self, pages: Vec<Vec<ResourceRef>>) -> Self {
        self.groups = pages;
        self
    }

    pub fn with_group(mut self, email: &str, name: &str) -> Self {
        push_single(&mut self.groups, resource(email, name));
        self
    }

    pub fn with_members(mut self, group: &str, members: Vec<GroupMember>) -> Self {
        self.members.insert(group.to_string(), vec![members]);
        self
    }

    pub fn with_member_pages(mut self, group: &str, pages: Vec<Vec<GroupMember>>) -> Self {
        self.members.insert(group.to_string(), pages);
        self
    }

    pub fn with_settings(mut self, group: &str, settings: GroupSettings) -> Self {
        self.settings.insert(group.to_string(), settings);
        self
    }

    /// Queues errors returned by the next calls to `key`
    pub fn failing(self, key: &str, errors: Vec<ApiError>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .extend(errors);
        self
    }

    pub fn calls(&self, key: &str) -> u32 {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.total.load(Ordering::SeqCst)
    }

    fn record(&self, key: String) -> Result<(), ApiError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(key.clone()).or_insert(0) += 1;
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn push_single(pages: &mut Vec<Vec<ResourceRef>>, item: ResourceRef) {
    match pages.last_mut() {
        Some(page) => page.push(item),
        None => pages.push(vec![item]),
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::not_found(format!("{what} not found"))
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn list_shared_drives(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError> {
        self.record("drives".to_string())?;
        Ok(serve_page(&self.drives, &cursor))
    }

    async fn list_drive_permissions(
        &self,
        drive: &ResourceId,
        _cursor: PageCursor,
    ) -> Result<Page<DrivePermission>, ApiError> {
        self.record(format!("permissions:{drive}"))?;
        match self.permissions.get(drive.as_str()) {
            Some(permissions) => Ok(Page::last(permissions.clone())),
            None => Err(not_found(drive.as_str())),
        }
    }

    async fn list_users(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError> {
        self.record("users".to_string())?;
        Ok(serve_page(&self.users, &cursor))
    }

    async fn get_auto_forwarding(&self, user: &ResourceId) -> Result<AutoForwarding, ApiError> {
        self.record(format!("forwarding:{user}"))?;
        self.forwarding
            .get(user.as_str())
            .cloned()
            .ok_or_else(|| not_found(user.as_str()))
    }

    async fn list_groups(&self, cursor: PageCursor) -> Result<Page<ResourceRef>, ApiError> {
        self.record("groups".to_string())?;
        Ok(serve_page(&self.groups, &cursor))
    }

    async fn list_group_members(
        &self,
        group: &ResourceId,
        cursor: PageCursor,
    ) -> Result<Page<GroupMember>, ApiError> {
        self.record(format!("members:{group}"))?;
        match self.members.get(group.as_str()) {
            Some(pages) => Ok(serve_page(pages, &cursor)),
            None => Err(not_found(group.as_str())),
        }
    }

    async fn get_group_settings(&self, group: &ResourceId) -> Result<GroupSettings, ApiError> {
        self.record(format!("settings:{group}"))?;
        self.settings
            .get(group.as_str())
            .cloned()
            .ok_or_else(|| not_found(group.as_str()))
    }
}

/// One artifact received by [`MemoryStorage`]
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub destination: String,
    pub content: Vec<u8>,
    pub convert: bool,
}

/// Archive storage keeping uploads in memory
pub struct MemoryStorage {
    exists: bool,
    failures: Mutex<VecDeque<ApiError>>,
    files: Mutex<Vec<StoredFile>>,
    probes: AtomicU32,
    attempts: AtomicU32,
}

impl MemoryStorage {
    pub fn new(exists: bool) -> Self {
        Self {
            exists,
            failures: Mutex::new(VecDeque::new()),
            files: Mutex::new(Vec::new()),
            probes: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
        }
    }

    /// Queues errors returned by the next uploads
    pub fn failing(self, errors: Vec<ApiError>) -> Self {
        self.failures.lock().unwrap().extend(errors);
        self
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.files.lock().unwrap().clone()
    }

    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn upload_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArchiveStorage for MemoryStorage {
    async fn folder_exists(&self, _destination: &DestinationId) -> Result<bool, ApiError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self.exists)
    }

    async fn create_file(
        &self,
        artifact: &ArchiveArtifact,
        destination: &DestinationId,
        convert: bool,
    ) -> Result<RemoteId, ApiError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let mut files = self.files.lock().unwrap();
        files.push(StoredFile {
            name: artifact.name().to_string(),
            destination: destination.to_string(),
            content: artifact.content().to_vec(),
            convert,
        });
        Ok(RemoteId::new(format!("remote-{}", files.len())))
    }
}
