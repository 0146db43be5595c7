//! GitLab client integration tests with mock server

use gitlab_mcp_server::auth::PatProvider;
use gitlab_mcp_server::config::GitLabConfig;
use gitlab_mcp_server::error::GitLabError;
use gitlab_mcp_server::gitlab::GitLabClient;
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "glpat-test-token-123456";

/// Helper to create a test client pointing to mock server
fn create_test_client(uri: &str) -> GitLabClient {
    client_with_token(uri, TOKEN)
}

fn client_with_token(uri: &str, token: &str) -> GitLabClient {
    let config = GitLabConfig {
        url: uri.to_string(),
        token: Some(token.into()),
        timeout_secs: 5,
        ..Default::default()
    };
    let auth = PatProvider::new(token).unwrap();
    GitLabClient::new(&config, Box::new(auth)).unwrap()
}

#[tokio::test]
async fn test_get_request_sends_token_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123"))
        .and(header("PRIVATE-TOKEN", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 123,
            "name": "test-project",
            "path_with_namespace": "group/test-project"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result: serde_json::Value = client.get("/projects/123").await.unwrap();

    assert_eq!(result["id"], 123);
    assert_eq!(result["name"], "test-project");
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v4/projects/123/issues"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"title": "New Issue"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 456,
            "iid": 1,
            "title": "New Issue"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let body = json!({"title": "New Issue"});
    let result: serde_json::Value = client.post("/projects/123/issues", &body).await.unwrap();

    assert_eq!(result["iid"], 1);
}

#[tokio::test]
async fn test_put_request_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/123/issues/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "iid": 1,
            "title": "Updated Issue"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result: serde_json::Value = client
        .put("/projects/123/issues/1", &json!({"title": "Updated Issue"}))
        .await
        .unwrap();

    assert_eq!(result["title"], "Updated Issue");
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/123/labels/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    client.delete("/projects/123/labels/7").await.unwrap();
}

#[tokio::test]
async fn test_get_text_returns_raw_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/jobs/9/trace"))
        .respond_with(ResponseTemplate::new(200).set_body_string("line 1\nline 2\n"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let log = client.get_text("/projects/1/jobs/9/trace").await.unwrap();

    assert_eq!(log, "line 1\nline 2\n");
}

#[tokio::test]
async fn test_get_page_reads_pagination_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1}, {"id": 2}]))
                .insert_header("X-Page", "2")
                .insert_header("X-Per-Page", "2")
                .insert_header("X-Next-Page", "3")
                .insert_header("X-Total", "10")
                .insert_header("X-Total-Pages", "5"),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let (items, headers) = client
        .get_page("/projects?page=2&per_page=2")
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(headers.page, Some(2));
    assert_eq!(headers.next_page, Some(3));
    assert!(headers.has_next_header);
    assert_eq!(headers.total, Some(10));
    assert_eq!(headers.total_pages, Some(5));
}

#[tokio::test]
async fn test_get_page_rejects_non_array_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client.get_page("/projects").await.unwrap_err();

    assert!(matches!(err, GitLabError::InvalidResponse(_)));
}

#[rstest]
#[case(400, "ValidationError")]
#[case(401, "AuthenticationError")]
#[case(403, "PermissionError")]
#[case(404, "NotFoundError")]
#[case(409, "ConflictError")]
#[case(422, "ValidationError")]
#[case(429, "RateLimitError")]
#[case(500, "UpstreamError")]
#[case(503, "UpstreamError")]
#[case(418, "HTTPError")]
#[tokio::test]
async fn test_status_maps_to_error_kind(#[case] status: u16, #[case] kind: &str) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/123"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "message": "something went wrong"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client
        .get::<serde_json::Value>("/projects/123")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), kind);
}

#[tokio::test]
async fn test_not_found_names_resource_without_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/999/issues"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "404 Project Not Found"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client
        .get_page("/projects/999/issues?page=1&per_page=20")
        .await
        .unwrap_err();

    match err {
        GitLabError::NotFound { resource, details } => {
            assert_eq!(resource, "/projects/999/issues");
            assert_eq!(details, "404 Project Not Found");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_uses_retry_after_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client
        .get::<serde_json::Value>("/projects")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GitLabError::RateLimited {
            retry_after: 17,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rate_limit_defaults_to_sixty_seconds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client
        .get::<serde_json::Value>("/projects")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GitLabError::RateLimited {
            retry_after: 60,
            ..
        }
    ));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client
        .get::<serde_json::Value>("/projects")
        .await
        .unwrap_err();

    assert!(matches!(err, GitLabError::Upstream { status: 502, .. }));
}

#[tokio::test]
async fn test_token_never_leaks_into_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": format!("token {} is invalid", TOKEN)
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client
        .get::<serde_json::Value>("/projects/1")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "AuthenticationError");
    assert!(!err.to_string().contains(TOKEN));
    assert!(!format!("{err:?}").contains(TOKEN));
    assert!(!err.details().unwrap_or_default().contains(TOKEN));
}

#[tokio::test]
async fn test_legacy_token_at_details_cutoff_is_masked() {
    let mock_server = MockServer::start().await;
    let legacy_token = "Zq8vR3mK1pX7tY2wN5bH";

    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": format!("{}{} rejected", "x".repeat(490), legacy_token)
        })))
        .mount(&mock_server)
        .await;

    let client = client_with_token(&mock_server.uri(), legacy_token);
    let err = client
        .get::<serde_json::Value>("/user")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "AuthenticationError");
    let details = err.details().unwrap();
    assert!(!details.contains("Zq8vR3mK1p"), "token prefix in {details}");
    assert!(!format!("{err:?}").contains("Zq8vR3mK1p"));
}

#[tokio::test]
async fn test_unreachable_host_is_connectivity_error() {
    // Bind then drop a listener to get a port with nothing behind it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = create_test_client(&format!("http://127.0.0.1:{port}"));
    let err = client
        .get::<serde_json::Value>("/projects")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "ConnectivityError");
    assert!(!err.to_string().contains(TOKEN));
}

#[tokio::test]
async fn test_verify_connection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "17.5.0",
            "revision": "abc123"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "root"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let info = client.verify_connection().await.unwrap();

    assert_eq!(info.version.as_deref(), Some("17.5.0"));
    assert_eq!(info.username, "root");
    assert!(!info.can_list_projects);
}

#[tokio::test]
async fn test_verify_connection_fails_on_bad_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/version"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client.verify_connection().await.unwrap_err();

    assert!(matches!(err, GitLabError::Authentication { .. }));
}
