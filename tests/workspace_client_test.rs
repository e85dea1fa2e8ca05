//! Workspace client requests and error classification against a mock server

mod common;

use common::{mock_session, TEST_TOKEN};
use gwarchive::adapters::directory::{DirectoryService, WorkspaceClient};
use gwarchive::domain::{ErrorClass, PageCursor, ResourceId};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn client(server: &ServerGuard, page_size: u32) -> WorkspaceClient {
    WorkspaceClient::new(mock_session(&server.url()), "my_customer", page_size)
}

fn id(value: &str) -> ResourceId {
    ResourceId::new(value).unwrap()
}

fn bearer() -> String {
    format!("Bearer {TEST_TOKEN}")
}

#[tokio::test]
async fn test_list_groups_follows_cursor() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/admin/directory/v1/groups")
        .match_header("authorization", bearer().as_str())
        .match_query(Matcher::Exact(
            "customer=my_customer&maxResults=200".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "groups": [{"email": "a@example.com", "name": "A"}],
                "nextPageToken": "n2"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/admin/directory/v1/groups")
        .match_query(Matcher::Exact(
            "customer=my_customer&maxResults=200&pageToken=n2".to_string(),
        ))
        .with_status(200)
        .with_body(json!({"groups": [{"email": "b@example.com", "name": "B"}]}).to_string())
        .create_async()
        .await;

    let client = client(&server, 500);
    let page = client.list_groups(PageCursor::start()).await.unwrap();
    assert_eq!(page.items[0].id.as_str(), "a@example.com");
    assert_eq!(page.next.token(), Some("n2"));

    let page = client.list_groups(page.next).await.unwrap();
    assert_eq!(page.items[0].name(), Some("B"));
    assert!(page.next.is_exhausted());

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_list_users_skips_suspended() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/admin/directory/v1/users")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("orderBy".into(), "email".into()),
            Matcher::UrlEncoded("maxResults".into(), "100".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "users": [
                    {"primaryEmail": "jo@example.com", "name": {"fullName": "Jo Doe"}},
                    {"primaryEmail": "gone@example.com", "name": {"fullName": "Gone"}, "suspended": true},
                    {"primaryEmail": "nameless@example.com"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let page = client(&server, 100)
        .list_users(PageCursor::start())
        .await
        .unwrap();

    let ids: Vec<_> = page.items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["jo@example.com", "nameless@example.com"]);
    assert_eq!(page.items[0].name(), Some("Jo Doe"));
    assert_eq!(page.items[1].name(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_drive_permissions() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/drive/v3/files/0AAA/permissions")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("supportsAllDrives".into(), "true".into()),
            Matcher::UrlEncoded("useDomainAdminAccess".into(), "true".into()),
            Matcher::UrlEncoded("pageSize".into(), "100".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "permissions": [
                    {"emailAddress": "cfo@example.com", "role": "organizer", "type": "user", "displayName": "CFO"},
                    {"role": "reader", "type": "domain"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let page = client(&server, 500)
        .list_drive_permissions(&id("0AAA"), PageCursor::start())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].display_name.as_deref(), Some("CFO"));
    assert_eq!(page.items[1].kind.as_deref(), Some("domain"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_group_settings_requests_json() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/groups/v1/groups/team@example.com")
        .match_query(Matcher::UrlEncoded("alt".into(), "json".into()))
        .with_status(200)
        .with_body(
            json!({
                "email": "team@example.com",
                "whoCanJoin": "CAN_REQUEST_TO_JOIN",
                "allowExternalMembers": "false"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let settings = client(&server, 100)
        .get_group_settings(&id("team@example.com"))
        .await
        .unwrap();

    assert_eq!(settings.field("whoCanJoin").as_deref(), Some("CAN_REQUEST_TO_JOIN"));
    assert_eq!(settings.field("description"), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_classification() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/admin/directory/v1/groups")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(json!({"error": {"code": 429, "message": "Too many requests"}}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/admin/directory/v1/groups/team@example.com/members")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(
            json!({
                "error": {
                    "code": 403,
                    "message": "Quota exceeded",
                    "errors": [{"reason": "userRateLimitExceeded"}]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client(&server, 100);

    let err = client.list_groups(PageCursor::start()).await.unwrap_err();
    assert_eq!(err.class, ErrorClass::RateLimited);
    assert_eq!(err.status, Some(429));
    assert_eq!(err.message, "Too many requests");

    let err = client
        .list_group_members(&id("team@example.com"), PageCursor::start())
        .await
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::RateLimited);
    assert_eq!(err.status, Some(403));
}

#[tokio::test]
async fn test_permission_denied_is_fatal_and_not_found_is_missing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/admin/directory/v1/groups/locked@example.com/members")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(json!({"error": {"code": 403, "message": "Not Authorized to access this resource/api"}}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/admin/directory/v1/groups/gone@example.com/members")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(json!({"error": {"code": 404, "message": "Resource Not Found: groupKey"}}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/admin/directory/v1/groups/busy@example.com/members")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let client = client(&server, 100);
    let members = |group: &'static str| {
        let client = client.clone();
        async move {
            client
                .list_group_members(&id(group), PageCursor::start())
                .await
                .unwrap_err()
        }
    };

    assert_eq!(members("locked@example.com").await.class, ErrorClass::Fatal);
    assert_eq!(members("gone@example.com").await.class, ErrorClass::NotFound);

    let busy = members("busy@example.com").await;
    assert_eq!(busy.class, ErrorClass::TransientService);
    assert_eq!(busy.message, "Service Unavailable");
}

#[tokio::test]
async fn test_mailbox_without_gmail_is_missing() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/gmail/v1/users/room@example.com/settings/autoForwarding")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(
            json!({"error": {"code": 400, "message": "Mail service not enabled", "status": "FAILED_PRECONDITION"}})
                .to_string(),
        )
        .create_async()
        .await;
    let forwarding = server
        .mock("GET", "/gmail/v1/users/jo@example.com/settings/autoForwarding")
        .match_query(Matcher::Any)
        .match_header("authorization", bearer().as_str())
        .with_status(200)
        .with_body(
            json!({"enabled": true, "emailAddress": "jo@elsewhere.com", "disposition": "archive"})
                .to_string(),
        )
        .create_async()
        .await;

    let client = client(&server, 100);

    let err = client
        .get_auto_forwarding(&id("room@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.class, ErrorClass::NotFound);

    let settings = client.get_auto_forwarding(&id("jo@example.com")).await.unwrap();
    assert_eq!(settings.active_target(), Some("jo@elsewhere.com"));
    forwarding.assert_async().await;
}

#[tokio::test]
async fn test_unparseable_body_is_fatal() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/drive/v3/drives")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let err = client(&server, 100)
        .list_shared_drives(PageCursor::start())
        .await
        .unwrap_err();

    assert_eq!(err.class, ErrorClass::Fatal);
}
