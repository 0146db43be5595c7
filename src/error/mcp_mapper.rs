//! MCP error mapping.
//!
//! Maps application errors to MCP results.
//!
//! # Strategy
//! - Protocol-level errors (tool not found, undecodable arguments) → `Err(McpError)`
//! - Validation and GitLab errors → `Ok(CallToolResult { is_error: true })` whose
//!   text is a JSON error payload:
//!
//! ```json
//! {
//!   "error": true,
//!   "error_type": "NotFoundError",
//!   "message": "Resource not found: /projects/42",
//!   "details": "404 Project Not Found",
//!   "retryable": false,
//!   "action": "Verify the resource ID or path is correct."
//! }
//! ```

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use serde_json::{Map, Value, json};
use std::borrow::Cow;

use super::{GitLabError, ToolError, ValidationError};

const VALIDATION_ACTION: &str = "Check the input parameters and try again.";

/// Maps a protocol-level `ToolError` to an MCP protocol error.
///
/// Only meaningful for errors where [`ToolError::is_protocol_error`] is true;
/// everything else should go through [`error_result`].
pub fn map_tool_error(error: &ToolError) -> McpError {
    match error {
        ToolError::NotFound(name) => McpError {
            code: ErrorCode::METHOD_NOT_FOUND,
            message: Cow::Owned(format!("Tool '{}' not found", name)),
            data: Some(json!({
                "tool": name,
                "error_type": "ToolNotFound"
            })),
        },

        ToolError::InvalidArguments(msg) => McpError {
            code: ErrorCode::INVALID_PARAMS,
            message: Cow::Owned(msg.clone()),
            data: Some(json!({
                "error_type": "InvalidArguments"
            })),
        },

        other => McpError {
            code: ErrorCode::INTERNAL_ERROR,
            message: Cow::Owned(other.to_string()),
            data: Some(error_payload(other)),
        },
    }
}

/// Builds the JSON error payload for a tool execution failure.
pub fn error_payload(error: &ToolError) -> Value {
    match error {
        ToolError::Validation(e) => validation_payload(e),
        ToolError::GitLab(e) => gitlab_payload(e),
        other => payload(other.kind(), other.to_string(), None, VALIDATION_ACTION),
    }
}

/// Payload for a locally rejected parameter.
pub fn validation_payload(error: &ValidationError) -> Value {
    let mut value = payload(
        error.kind.as_str(),
        error.to_string(),
        Some(&error.reason),
        VALIDATION_ACTION,
    );
    if let Some(map) = value.as_object_mut() {
        map.insert("parameter".to_string(), Value::String(error.param.clone()));
    }
    value
}

/// Payload for an upstream failure.
pub fn gitlab_payload(error: &GitLabError) -> Value {
    let mut value = payload(error.kind(), error.to_string(), error.details(), error.action());
    if let Some(map) = value.as_object_mut() {
        map.insert("retryable".to_string(), Value::Bool(error.is_retryable()));
        if let GitLabError::RateLimited { retry_after, .. } = error {
            map.insert("retry_after".to_string(), json!(retry_after));
        }
    }
    value
}

fn payload(error_type: &str, message: String, details: Option<&str>, action: &str) -> Value {
    let mut map = Map::new();
    map.insert("error".to_string(), Value::Bool(true));
    map.insert("error_type".to_string(), Value::String(error_type.to_string()));
    map.insert("message".to_string(), Value::String(message));
    if let Some(details) = details {
        map.insert("details".to_string(), Value::String(details.to_string()));
    }
    map.insert("action".to_string(), Value::String(action.to_string()));
    Value::Object(map)
}

/// Wraps a tool execution failure as an MCP tool result with `is_error` set.
pub fn error_result(error: &ToolError) -> CallToolResult {
    let payload = error_payload(error);
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| error.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        is_error: Some(true),
        meta: None,
        structured_content: Some(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_tool_not_found() {
        let error = ToolError::NotFound("unknown_tool".into());
        let mcp_error = map_tool_error(&error);

        assert_eq!(mcp_error.code, ErrorCode::METHOD_NOT_FOUND);
        assert!(mcp_error.message.contains("unknown_tool"));
        assert!(mcp_error.data.is_some());
    }

    #[test]
    fn test_map_invalid_arguments() {
        let error = ToolError::InvalidArguments("project_id must be present".into());
        let mcp_error = map_tool_error(&error);

        assert_eq!(mcp_error.code, ErrorCode::INVALID_PARAMS);
        assert!(mcp_error.message.contains("project_id"));
    }

    #[test]
    fn test_validation_payload() {
        let error = ToolError::from(ValidationError::pagination(
            "per_page",
            "must be between 1 and 100, got 0",
        ));
        let payload = error_payload(&error);

        assert_eq!(payload["error"], true);
        assert_eq!(payload["error_type"], "InvalidPagination");
        assert_eq!(payload["parameter"], "per_page");
        assert_eq!(payload["details"], "must be between 1 and 100, got 0");
        assert!(payload["action"].is_string());
    }

    #[test]
    fn test_gitlab_payload_shape() {
        let error = GitLabError::from_response(
            404,
            r#"{"message":"404 Not Found"}"#,
            "/projects/42",
            "",
        );
        let payload = gitlab_payload(&error);

        assert_eq!(payload["error"], true);
        assert_eq!(payload["error_type"], "NotFoundError");
        assert_eq!(payload["message"], "Resource not found: /projects/42");
        assert_eq!(payload["details"], "404 Not Found");
        assert_eq!(payload["retryable"], false);
        assert_eq!(payload["action"], "Verify the resource ID or path is correct.");
    }

    #[test]
    fn test_details_omitted_when_empty() {
        let error = GitLabError::from_response(403, "", "/projects/1", "");
        let payload = gitlab_payload(&error);
        assert!(payload.get("details").is_none());
    }

    #[test]
    fn test_rate_limit_payload_has_retry_after() {
        let error = GitLabError::from_response(429, "", "/projects", "").with_retry_after(Some(30));
        let payload = gitlab_payload(&error);

        assert_eq!(payload["error_type"], "RateLimitError");
        assert_eq!(payload["retry_after"], 30);
        assert_eq!(payload["retryable"], true);
    }

    #[test]
    fn test_error_result_is_error() {
        let error = ToolError::from(GitLabError::Connectivity {
            reason: "request timed out after 30s".into(),
        });
        let result = error_result(&error);

        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["error_type"], "ConnectivityError");
    }
}
