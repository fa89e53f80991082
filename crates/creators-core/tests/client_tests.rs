use creators_core::api::{ApiClient, ApiError, Resource};
use creators_core::auth::{PersistedToken, Session, SessionData, StaticToken};
use creators_core::models::{
    DevLoginRequest, EntityInput, EntityUpdate, Identity, ListQuery, Platform, Status,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Fixtures ────────────────────────────────────────────────────

const PLATFORM_ID: &str = "507f1f77bcf86cd799439011";

fn breadcrumb() -> Value {
    json!({
        "from_ip": "127.0.0.1",
        "by_user": "user1",
        "at_time": "2024-01-01T00:00:00Z",
        "correlation_id": "corr-123"
    })
}

fn platform_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "status": "active",
        "created": breadcrumb(),
        "saved": breadcrumb()
    })
}

fn page_json(items: Vec<Value>, has_more: bool, next_cursor: Option<&str>) -> Value {
    json!({
        "items": items,
        "limit": 20,
        "has_more": has_more,
        "next_cursor": next_cursor
    })
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), StaticToken::new("test-token")).unwrap()
}

// ── Lists ───────────────────────────────────────────────────────

#[tokio::test]
async fn get_platforms_returns_page_unchanged() {
    let server = MockServer::start().await;
    let mut described = platform_json(PLATFORM_ID, "test-platform");
    described["description"] = json!("Test description");
    let body = page_json(vec![described], false, None);

    Mock::given(method("GET"))
        .and(path("/api/platform"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server).get_platforms(&ListQuery::default()).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, PLATFORM_ID);
    assert_eq!(page.items[0].description.as_deref(), Some("Test description"));
    assert!(!page.has_more);
    assert_eq!(page.next_cursor, None);
    assert_eq!(serde_json::to_value(&page).unwrap(), body);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn get_platforms_with_name_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/platform"))
        .and(query_param("name", "test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], false, None)))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .get_platforms(&ListQuery::new().name("test"))
        .await
        .unwrap();
    assert!(page.items.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("name=test"));
}

#[tokio::test]
async fn get_identities_parses_free_form_status() {
    let server = MockServer::start().await;
    let identity = json!({"_id": "id-1", "name": "alice", "status": "pending-review"});

    Mock::given(method("GET"))
        .and(path("/api/identity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![identity], false, None)))
        .mount(&server)
        .await;

    let page = client(&server).get_identities(&ListQuery::default()).await.unwrap();
    assert_eq!(
        page.items,
        vec![Identity {
            id: "id-1".to_string(),
            name: "alice".to_string(),
            description: None,
            status: Some("pending-review".to_string()),
        }]
    );
}

#[tokio::test]
async fn list_all_follows_cursors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(query_param_is_missing("after_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![platform_json("u1", "one"), platform_json("u2", "two")],
            true,
            Some("u2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(query_param("after_id", "u2"))
        .and(query_param("name", "o"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![platform_json("u3", "three")],
            false,
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let users: Vec<Platform> = client(&server)
        .list_all(Resource::User, &ListQuery::new().name("o"))
        .await
        .unwrap();
    let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["u1", "u2", "u3"]);
}

#[tokio::test]
async fn list_all_stops_when_cursors_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .and(query_param_is_missing("after_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![platform_json("p1", "one")],
            true,
            Some("a"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .and(query_param("after_id", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![platform_json("p2", "two")],
            true,
            Some("b"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    // Points back at a cursor already followed
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .and(query_param("after_id", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![platform_json("p3", "three")],
            true,
            Some("a"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let profiles: Vec<Platform> = client(&server)
        .list_all(Resource::Profile, &ListQuery::default())
        .await
        .unwrap();
    let ids: Vec<_> = profiles.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

// ── Single records ──────────────────────────────────────────────

#[tokio::test]
async fn get_platform_returns_record_unchanged() {
    let server = MockServer::start().await;
    let body = platform_json(PLATFORM_ID, "test-platform");

    Mock::given(method("GET"))
        .and(path(format!("/api/platform/{}", PLATFORM_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let platform = client(&server).get_platform(PLATFORM_ID).await.unwrap();
    assert_eq!(platform.name, "test-platform");
    assert_eq!(platform.status, Some(Status::Active));
    assert_eq!(serde_json::to_value(&platform).unwrap(), body);
}

#[tokio::test]
async fn timestamps_are_returned_as_sent() {
    let server = MockServer::start().await;
    let mut body = platform_json(PLATFORM_ID, "offset-platform");
    body["created"]["at_time"] = json!("2024-01-01T02:00:00+02:00");
    body["saved"]["at_time"] = json!("2024-01-01T00:00:00.123456");

    Mock::given(method("GET"))
        .and(path(format!("/api/platform/{}", PLATFORM_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let platform = client(&server).get_platform(PLATFORM_ID).await.unwrap();
    assert_eq!(platform.created.at_time, "2024-01-01T02:00:00+02:00");
    assert!(platform.saved.time().is_some());
    assert_eq!(serde_json::to_value(&platform).unwrap(), body);
}

#[tokio::test]
async fn create_platform_posts_input() {
    let server = MockServer::start().await;
    let input = EntityInput::new("new-platform")
        .description("New description")
        .status(Status::Active);

    Mock::given(method("POST"))
        .and(path("/api/platform"))
        .and(body_json(json!({
            "name": "new-platform",
            "description": "New description",
            "status": "active"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": PLATFORM_ID})))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server).create_platform(&input).await.unwrap();
    assert_eq!(created.id, PLATFORM_ID);
}

#[tokio::test]
async fn update_platform_patches_partial() {
    let server = MockServer::start().await;
    let update = EntityUpdate {
        name: Some("updated-name".to_string()),
        ..Default::default()
    };

    Mock::given(method("PATCH"))
        .and(path(format!("/api/platform/{}", PLATFORM_ID)))
        .and(body_json(json!({"name": "updated-name"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(platform_json(PLATFORM_ID, "updated-name")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let platform = client(&server).update_platform(PLATFORM_ID, &update).await.unwrap();
    assert_eq!(platform.name, "updated-name");
}

#[tokio::test]
async fn profile_and_user_share_the_contract() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/profile"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "p1"})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/user/u1"))
        .and(body_json(json!({"status": "archived"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(platform_json("u1", "someone")))
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(api.create_profile(&EntityInput::new("p")).await.unwrap().id, "p1");

    let update = EntityUpdate {
        status: Some(Status::Archived),
        ..Default::default()
    };
    assert_eq!(api.update_user("u1", &update).await.unwrap().id, "u1");
}

// ── Errors ──────────────────────────────────────────────────────

#[tokio::test]
async fn not_found_is_identifiable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/platform/invalid-id"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Resource not found"})))
        .mount(&server)
        .await;

    let err = client(&server).get_platform("invalid-id").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ApiError::Http { ref message, .. } if message == "Resource not found"));
}

#[tokio::test]
async fn unauthorized_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/platform"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Unauthorized"})))
        .mount(&server)
        .await;

    let err = client(&server).get_platforms(&ListQuery::default()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("Unauthorized"));
}

#[tokio::test]
async fn error_without_json_body_uses_status_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/profile/p1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client(&server).get_profile("p1").await.unwrap_err();
    match err {
        ApiError::Http { status, message } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn network_error_is_propagated_unchanged() {
    // Reserve a free port, then release it so nothing listens there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = ApiClient::new(&format!("http://127.0.0.1:{}", port), StaticToken::new("test-token")).unwrap();

    let err = api.get_platforms(&ListQuery::default()).await.unwrap_err();
    match &err {
        ApiError::Network(source) => {
            assert_eq!(err.to_string(), source.to_string());
            assert!(source.is_connect() || source.is_request());
        }
        other => panic!("expected Network error, got {:?}", other),
    }
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn unreadable_error_body_keeps_status() {
    use std::io::{Read, Write};

    // Answers 503 and hangs up before the promised body is complete
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = [0u8; 4096];
        let _ = stream.read(&mut request);
        stream
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 100\r\n\r\n{\"err")
            .unwrap();
    });

    let api = ApiClient::new(&format!("http://127.0.0.1:{}", port), StaticToken::none()).unwrap();
    let err = api.get_user("u1").await.unwrap_err();
    server.join().unwrap();

    match err {
        ApiError::Http { status, message } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_success_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/u1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client(&server).get_user("u1").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

// ── Authentication ──────────────────────────────────────────────

#[tokio::test]
async fn missing_token_sends_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], false, None)))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), StaticToken::none()).unwrap();
    api.get_profiles(&ListQuery::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn persisted_token_is_read_per_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], false, None)))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), PersistedToken::new(dir.path().to_path_buf())).unwrap();
    api.get_profiles(&ListQuery::default()).await.unwrap();

    let mut session = Session::new(dir.path().to_path_buf());
    session.update(SessionData {
        access_token: "fresh-token".to_string(),
        token_type: "bearer".to_string(),
        expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
        subject: "dev-user".to_string(),
        roles: vec![],
        created_at: chrono::Utc::now(),
    });
    session.save().unwrap();
    api.get_profiles(&ListQuery::default()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[1].headers.get("authorization").unwrap().to_str().unwrap(),
        "Bearer fresh-token"
    );
}

#[tokio::test]
async fn dev_login_posts_subject_and_roles() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dev-login"))
        .and(body_json(json!({"subject": "dev-user", "roles": ["admin"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "minted",
            "token_type": "bearer",
            "expires_at": "2030-01-01T00:00:00Z",
            "subject": "dev-user",
            "roles": ["admin"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = DevLoginRequest {
        subject: Some("dev-user".to_string()),
        roles: Some(vec!["admin".to_string()]),
    };
    let api = ApiClient::new(&server.uri(), StaticToken::none()).unwrap();
    let response = api.dev_login(&request).await.unwrap();

    assert_eq!(response.access_token, "minted");
    let data = SessionData::from_login(response);
    assert!(data.has_role("admin"));
    assert!(!data.is_expired());
}

#[tokio::test]
async fn get_config_document() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config_items": [{"name": "BUILT_AT", "value": "local"}],
            "versions": [],
            "enumerators": [{"name": "status", "values": ["active", "archived"]}],
            "token": {"claims": {"sub": "dev-user"}}
        })))
        .mount(&server)
        .await;

    let config = client(&server).get_config().await.unwrap();
    assert_eq!(config.config_items.len(), 1);
    assert_eq!(config.enumerators.len(), 1);
    let claims = config.token.and_then(|t| t.claims).unwrap();
    assert_eq!(claims["sub"], "dev-user");
}
