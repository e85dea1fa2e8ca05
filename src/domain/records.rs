//! Records flowing through an export run
//!
//! [`ResourceRef`]s come out of the top-level listing, [`Page`]s and
//! [`PageCursor`]s are what a paginated endpoint hands back, and
//! [`ReportRow`]s are what the tabular writer consumes.

use super::ids::ResourceId;
use std::collections::HashMap;

/// Lightweight reference to a top-level directory entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Stable identifier (drive id, primary email, group email)
    pub id: ResourceId,

    /// Display name (drive name, user full name, group name), if the
    /// directory has one
    pub name: Option<String>,
}

impl ResourceRef {
    /// Creates a new resource reference
    pub fn new(id: ResourceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// Creates a reference for an entity without a display name
    pub fn unnamed(id: ResourceId) -> Self {
        Self { id, name: None }
    }

    /// Display name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Opaque continuation token of a paginated listing
///
/// `None` or an empty token means the listing is exhausted. A non-empty
/// token is passed back to the server unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageCursor(Option<String>);

impl PageCursor {
    /// Cursor for the first page of a listing
    pub fn start() -> Self {
        Self(None)
    }

    /// Cursor built from a server's `nextPageToken`
    pub fn from_token(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.is_empty()))
    }

    /// The token to send with the next request, if any
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether no further page exists
    pub fn is_exhausted(&self) -> bool {
        self.0.is_none()
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server response order
    pub items: Vec<T>,

    /// Cursor for the following page
    pub next: PageCursor,
}

impl<T> Page<T> {
    /// Creates a page
    pub fn new(items: Vec<T>, next: PageCursor) -> Self {
        Self { items, next }
    }

    /// Creates the final page of a listing
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, PageCursor::start())
    }
}

/// One output row, keyed by column name
///
/// Column order is never derived from this map; the writer walks the
/// report schema and looks each column up here. Columns absent from the row
/// are rendered with the missing-field placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRow {
    fields: HashMap<String, String>,
}

impl ReportRow {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    /// Sets a column value if present, leaving the column missing otherwise
    pub fn with_opt(self, column: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with(column, value),
            None => self,
        }
    }

    /// Looks up a column value
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Number of populated columns
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no column is populated
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
