//! External system integrations for gwarchive.
//!
//! - [`auth`] - OAuth token sources and the per-run [`auth::Session`]
//! - [`http`] - Response and transport error classification
//! - [`directory`] - Directory, Drive, Gmail and Groups Settings reads
//! - [`storage`] - Drive folder archival
//!
//! # Design Pattern
//!
//! Adapters isolate the Google APIs behind the [`directory::DirectoryService`]
//! and [`storage::ArchiveStorage`] traits, so the export engine can be run
//! against scripted implementations in tests. Adapter calls make exactly one
//! request each and report failures as classified
//! [`crate::domain::errors::ApiError`]s; retrying happens in the core.
//!
//! ```rust,no_run
//! use gwarchive::adapters::auth::{Endpoints, Session, StaticToken};
//! use gwarchive::adapters::directory::{DirectoryService, WorkspaceClient};
//! use gwarchive::config::secret_string;
//! use gwarchive::domain::records::PageCursor;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tokens = Arc::new(StaticToken::new(secret_string("ya29.token".to_string())));
//! let session = Session::new(
//!     reqwest::Client::new(),
//!     tokens,
//!     "admin@example.com",
//!     Endpoints::all_at("https://mock.example.com"),
//! );
//!
//! let client = WorkspaceClient::new(session, "my_customer", 200);
//! let page = client.list_groups(PageCursor::start()).await?;
//! println!("First page: {} groups", page.items.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod directory;
pub mod http;
pub mod storage;
