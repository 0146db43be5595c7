//! Server handler integration tests

use gitlab_mcp_server::config::{AppConfig, GitLabConfig, ServerConfig};
use gitlab_mcp_server::server::GitLabMcpHandler;
use rmcp::handler::server::ServerHandler;
use rmcp::model::ErrorCode;
use serde_json::{Map, Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create test configuration
fn create_test_config(gitlab_url: &str) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            name: "test-gitlab-mcp".to_string(),
            version: "0.1.0".to_string(),
            ..Default::default()
        },
        gitlab: GitLabConfig {
            url: gitlab_url.to_string(),
            token: Some("test-token".into()),
            timeout_secs: 5,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn create_test_handler(mock_server: &MockServer) -> GitLabMcpHandler {
    GitLabMcpHandler::from_config(&create_test_config(&mock_server.uri())).unwrap()
}

fn args(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[tokio::test]
async fn test_server_info() {
    let mock_server = MockServer::start().await;
    let handler = create_test_handler(&mock_server);

    let info = handler.get_info();
    assert_eq!(info.server_info.name, "test-gitlab-mcp");
    assert_eq!(info.server_info.version, "0.1.0");
    assert!(info.capabilities.tools.is_some());
    assert!(info.instructions.is_some());
}

#[tokio::test]
async fn test_tool_list_is_sorted_and_annotated() {
    let mock_server = MockServer::start().await;
    let handler = create_test_handler(&mock_server);

    let tools = handler.get_mcp_tools();
    assert_eq!(tools.len(), handler.tool_count());
    assert_eq!(tools.len(), 63);

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    let get_project = tools.iter().find(|t| t.name == "get_project").unwrap();
    let annotations = get_project.annotations.as_ref().unwrap();
    assert_eq!(annotations.read_only_hint, Some(true));
    assert_eq!(get_project.input_schema.get("type"), Some(&json!("object")));
    assert!(get_project.input_schema.get("properties").is_some());

    let delete_project = tools.iter().find(|t| t.name == "delete_project").unwrap();
    let annotations = delete_project.annotations.as_ref().unwrap();
    assert_eq!(annotations.read_only_hint, Some(false));
    assert_eq!(annotations.destructive_hint, Some(true));
}

#[tokio::test]
async fn test_call_tool_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapp/merge_requests/3"))
        .and(header("PRIVATE-TOKEN", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 300,
            "iid": 3,
            "title": "Add feature",
            "state": "opened",
            "source_branch": "feature",
            "target_branch": "main",
            "author": {"username": "alice"},
            "web_url": "https://gitlab.example.com/group/app/-/merge_requests/3",
            "diff_refs": {"base_sha": "a"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let handler = create_test_handler(&mock_server);
    let result = handler
        .call(
            "get_merge_request",
            args(json!({"project_id": "group/app", "mr_iid": 3})),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let structured = result.structured_content.unwrap();
    assert_eq!(structured["title"], "Add feature");
    assert!(structured.get("diff_refs").is_none());
    assert_eq!(result.content.len(), 1);
}

#[tokio::test]
async fn test_validation_failure_is_error_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let handler = create_test_handler(&mock_server);
    let result = handler
        .call("list_issues", args(json!({"project_id": 1, "per_page": 500})))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    let payload = result.structured_content.unwrap();
    assert_eq!(payload["error"], true);
    assert_eq!(payload["error_type"], "InvalidPagination");
    assert_eq!(payload["parameter"], "per_page");
    assert!(payload["action"].is_string());
}

#[tokio::test]
async fn test_gitlab_failure_is_error_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/issues/5"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "403 Forbidden"
        })))
        .mount(&mock_server)
        .await;

    let handler = create_test_handler(&mock_server);
    let result = handler
        .call("get_issue", args(json!({"project_id": 1, "issue_iid": 5})))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    let payload = result.structured_content.unwrap();
    assert_eq!(payload["error_type"], "PermissionError");
    assert_eq!(payload["details"], "403 Forbidden");
    assert_eq!(payload["retryable"], false);
    assert!(!payload.to_string().contains("test-token"));
}

#[tokio::test]
async fn test_rate_limit_payload_has_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&mock_server)
        .await;

    let handler = create_test_handler(&mock_server);
    let result = handler.call("get_current_user", None).await.unwrap();

    let payload = result.structured_content.unwrap();
    assert_eq!(payload["error_type"], "RateLimitError");
    assert_eq!(payload["retry_after"], 30);
    assert_eq!(payload["retryable"], true);
}

#[tokio::test]
async fn test_unknown_tool_is_protocol_error() {
    let mock_server = MockServer::start().await;
    let handler = create_test_handler(&mock_server);

    let err = handler.call("nonexistent_tool", None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_bad_argument_types_are_protocol_error() {
    let mock_server = MockServer::start().await;
    let handler = create_test_handler(&mock_server);

    let err = handler
        .call("get_issue", args(json!({"project_id": 1, "issue_iid": "three"})))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}
