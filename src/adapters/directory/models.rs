//! Workspace API models
//!
//! Wire shapes of the Directory, Drive, Gmail and Groups Settings responses
//! gwarchive reads. Only the fields that end up in a report are modelled.

use crate::domain::ids::ResourceId;
use crate::domain::records::{PageCursor, ResourceRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `drives.list` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveList {
    #[serde(default)]
    pub drives: Vec<SharedDrive>,
    pub next_page_token: Option<String>,
}

/// A shared drive
#[derive(Debug, Clone, Deserialize)]
pub struct SharedDrive {
    pub id: String,
    pub name: Option<String>,
}

/// `permissions.list` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionList {
    #[serde(default)]
    pub permissions: Vec<DrivePermission>,
    pub next_page_token: Option<String>,
}

/// One access grant on a shared drive
///
/// Every field is optional: `anyone` and `domain` grants have no email
/// address, deleted accounts have no display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivePermission {
    pub email_address: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub display_name: Option<String>,
}

/// `users.list` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
    pub next_page_token: Option<String>,
}

/// A directory user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub primary_email: String,
    #[serde(default)]
    pub name: Option<UserName>,
    #[serde(default)]
    pub suspended: bool,
}

/// A user's name parts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    pub full_name: Option<String>,
}

impl DirectoryUser {
    /// Display name, if the directory has one
    pub fn full_name(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.full_name.as_deref())
    }
}

/// Gmail `settings.getAutoForwarding` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoForwarding {
    #[serde(default)]
    pub enabled: bool,
    pub email_address: Option<String>,
    pub disposition: Option<String>,
}

impl AutoForwarding {
    /// Forwarding target, when forwarding is on and has a target
    pub fn active_target(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.email_address.as_deref().filter(|a| !a.is_empty())
    }

    /// Whether mail is forwarded at all, with or without a known target
    pub fn is_forwarding(&self) -> bool {
        self.enabled
    }
}

/// `groups.list` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupList {
    #[serde(default)]
    pub groups: Vec<DirectoryGroup>,
    pub next_page_token: Option<String>,
}

/// A directory group
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryGroup {
    pub email: String,
    pub name: Option<String>,
}

/// `members.list` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberList {
    #[serde(default)]
    pub members: Vec<GroupMember>,
    pub next_page_token: Option<String>,
}

/// One member of a group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl GroupMember {
    /// Convenience constructor for an active user member
    pub fn new(email: impl Into<String>, role: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            role: Some(role.into()),
            status: Some(status.into()),
            kind: Some("USER".to_string()),
        }
    }
}

/// Groups Settings resource, kept as the raw JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSettings(pub Map<String, Value>);

impl GroupSettings {
    /// Renders one field as a report cell
    ///
    /// Strings are returned as-is, other JSON values as their JSON text.
    /// Absent and `null` fields are `None`.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Builds the page of resource refs for a listing response
pub(crate) fn page_refs<T>(
    items: impl IntoIterator<Item = T>,
    next_page_token: Option<String>,
    to_ref: impl Fn(T) -> Option<ResourceRef>,
) -> (Vec<ResourceRef>, PageCursor) {
    let refs = items.into_iter().filter_map(to_ref).collect();
    (refs, PageCursor::from_token(next_page_token))
}

/// Resource ref of an entity, dropping entities without a usable id
pub(crate) fn resource_ref(id: &str, name: Option<&str>) -> Option<ResourceRef> {
    match ResourceId::new(id) {
        Ok(id) => Some(ResourceRef {
            id,
            name: name.map(str::to_string),
        }),
        Err(reason) => {
            tracing::warn!(
                id,
                name,
                reason = %reason,
                "Dropping listed entity without a usable id"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_permission_list_parse() {
        let list: PermissionList = serde_json::from_value(json!({
            "permissions": [
                {"emailAddress": "a@example.com", "role": "organizer", "type": "user", "displayName": "A"},
                {"role": "reader", "type": "domain"}
            ],
            "nextPageToken": "tok"
        }))
        .unwrap();

        assert_eq!(list.permissions.len(), 2);
        assert_eq!(list.permissions[0].kind.as_deref(), Some("user"));
        assert_eq!(list.permissions[1].email_address, None);
        assert_eq!(list.next_page_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_empty_listing_parse() {
        let list: GroupList = serde_json::from_value(json!({"kind": "admin#directory#groups"})).unwrap();
        assert!(list.groups.is_empty());
        assert!(list.next_page_token.is_none());
    }

    #[test]
    fn test_user_full_name() {
        let user: DirectoryUser = serde_json::from_value(json!({
            "primaryEmail": "jo@example.com",
            "name": {"givenName": "Jo", "familyName": "Doe", "fullName": "Jo Doe"}
        }))
        .unwrap();
        assert_eq!(user.full_name(), Some("Jo Doe"));
        assert!(!user.suspended);

        let nameless: DirectoryUser =
            serde_json::from_value(json!({"primaryEmail": "room@example.com"})).unwrap();
        assert_eq!(nameless.full_name(), None);

        let drive: SharedDrive = serde_json::from_value(json!({"id": "0AAA"})).unwrap();
        assert_eq!(drive.name, None);
    }

    #[test]
    fn test_forwarding_target() {
        let on = AutoForwarding {
            enabled: true,
            email_address: Some("out@elsewhere.com".to_string()),
            disposition: Some("leaveInInbox".to_string()),
        };
        assert_eq!(on.active_target(), Some("out@elsewhere.com"));

        let off = AutoForwarding {
            enabled: false,
            ..on.clone()
        };
        assert_eq!(off.active_target(), None);
        assert!(!off.is_forwarding());

        let no_target = AutoForwarding {
            enabled: true,
            email_address: None,
            disposition: None,
        };
        assert_eq!(no_target.active_target(), None);
        assert!(no_target.is_forwarding());
    }

    #[test]
    fn test_settings_field_rendering() {
        let settings: GroupSettings = serde_json::from_value(json!({
            "email": "team@example.com",
            "maxMessageBytes": 26214400,
            "isArchived": "false",
            "aliases": ["a@example.com"],
            "description": null
        }))
        .unwrap();

        assert_eq!(settings.field("email").as_deref(), Some("team@example.com"));
        assert_eq!(settings.field("maxMessageBytes").as_deref(), Some("26214400"));
        assert_eq!(settings.field("aliases").as_deref(), Some("[\"a@example.com\"]"));
        assert_eq!(settings.field("description"), None);
        assert_eq!(settings.field("whoCanJoin"), None);
    }

    #[test]
    fn test_blank_ids_dropped() {
        let (refs, next) = page_refs(
            vec![("d1", Some("One")), ("", Some("Blank")), ("d2", None)],
            Some(String::new()),
            |(id, name)| resource_ref(id, name),
        );
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name(), Some("One"));
        assert_eq!(refs[1].name(), None);
        assert!(next.is_exhausted());
    }
}
