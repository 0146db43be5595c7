//! Error types for gitlab-mcp-server
//!
//! This module defines the error hierarchy used throughout the application.
//! We use `thiserror` for library-style errors that are part of the API,
//! and convert to MCP results at the boundary (see [`mcp_mapper`]).
//!
//! Two families of errors reach a caller:
//! - [`ValidationError`]: raised locally, before any request is sent
//! - [`GitLabError`]: derived from the upstream response or transport failure

pub mod mcp_mapper;

use crate::util::redact;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Default wait suggested for a 429 without a usable `Retry-After` header
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Longest upstream body echoed back as error details
const MAX_DETAILS_CHARS: usize = 500;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("GitLab API error: {0}")]
    GitLab(#[from] GitLabError),

    #[error("Tool execution error: {0}")]
    Tool(#[from] ToolError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

/// Category of a locally detected input problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// Project/group/resource identifier is neither a positive integer nor a path
    InvalidIdentifier,
    /// `page` / `per_page` out of range
    InvalidPagination,
    /// Branch, tag or ref name that git would reject
    InvalidReference,
    /// Malformed `include_fields` list
    InvalidFieldList,
    /// Any other argument outside its allowed values
    InvalidArgument,
}

impl ValidationKind {
    /// Tag reported to the caller as `error_type`
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::InvalidIdentifier => "InvalidIdentifier",
            ValidationKind::InvalidPagination => "InvalidPagination",
            ValidationKind::InvalidReference => "InvalidReference",
            ValidationKind::InvalidFieldList => "InvalidFieldList",
            ValidationKind::InvalidArgument => "InvalidArgument",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected tool parameter: kind, offending parameter and reason
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value for '{param}': {reason}")]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub param: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(kind: ValidationKind, param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub fn identifier(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationKind::InvalidIdentifier, param, reason)
    }

    pub fn pagination(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationKind::InvalidPagination, param, reason)
    }

    pub fn reference(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationKind::InvalidReference, param, reason)
    }

    pub fn field_list(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationKind::InvalidFieldList, param, reason)
    }

    pub fn argument(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ValidationKind::InvalidArgument, param, reason)
    }
}

/// GitLab API specific errors
///
/// `details` carries GitLab's own explanation (the `message`/`error` field of
/// the body, or the raw text), already scrubbed of token-shaped substrings.
#[derive(Error, Debug, Clone)]
pub enum GitLabError {
    #[error("Authentication failed: check your access token")]
    Authentication { details: String },

    #[error("Permission denied: token lacks required scope or user lacks access")]
    Permission { details: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String, details: String },

    #[error("Conflict with the current state of the resource")]
    Conflict { details: String },

    #[error("GitLab rejected the request parameters")]
    Validation { details: String },

    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64, details: String },

    #[error("GitLab server error (HTTP {status})")]
    Upstream { status: u16, details: String },

    #[error("Could not reach GitLab: {reason}")]
    Connectivity { reason: String },

    #[error("GitLab API error (HTTP {status})")]
    Http { status: u16, details: String },

    #[error("Invalid response from GitLab: {0}")]
    InvalidResponse(String),
}

impl GitLabError {
    /// Create an appropriate error from an HTTP status code and response body.
    ///
    /// `resource` is the requested endpoint path, echoed back for 404s.
    /// `secret` is masked in the body before it is cut to length; pass `""`
    /// when no token is configured.
    pub fn from_response(status: u16, body: &str, resource: &str, secret: &str) -> Self {
        let details = extract_details(body, secret);
        match status {
            400 | 422 => GitLabError::Validation { details },
            401 => GitLabError::Authentication { details },
            403 => GitLabError::Permission { details },
            404 => GitLabError::NotFound {
                resource: redact(resource, secret),
                details,
            },
            409 => GitLabError::Conflict { details },
            429 => GitLabError::RateLimited {
                retry_after: DEFAULT_RETRY_AFTER_SECS,
                details,
            },
            500..=599 => GitLabError::Upstream { status, details },
            _ => GitLabError::Http { status, details },
        }
    }

    /// Apply a `Retry-After` value to a rate-limit error.
    pub fn with_retry_after(self, seconds: Option<u64>) -> Self {
        match (self, seconds) {
            (GitLabError::RateLimited { details, .. }, Some(retry_after)) => {
                GitLabError::RateLimited {
                    retry_after,
                    details,
                }
            }
            (other, _) => other,
        }
    }

    /// Remove every occurrence of `secret` from the error's text.
    pub fn redact(self, secret: &str) -> Self {
        let r = |s: String| redact(&s, secret);
        match self {
            GitLabError::Authentication { details } => GitLabError::Authentication {
                details: r(details),
            },
            GitLabError::Permission { details } => GitLabError::Permission {
                details: r(details),
            },
            GitLabError::NotFound { resource, details } => GitLabError::NotFound {
                resource: r(resource),
                details: r(details),
            },
            GitLabError::Conflict { details } => GitLabError::Conflict {
                details: r(details),
            },
            GitLabError::Validation { details } => GitLabError::Validation {
                details: r(details),
            },
            GitLabError::RateLimited {
                retry_after,
                details,
            } => GitLabError::RateLimited {
                retry_after,
                details: r(details),
            },
            GitLabError::Upstream { status, details } => GitLabError::Upstream {
                status,
                details: r(details),
            },
            GitLabError::Connectivity { reason } => GitLabError::Connectivity { reason: r(reason) },
            GitLabError::Http { status, details } => GitLabError::Http {
                status,
                details: r(details),
            },
            GitLabError::InvalidResponse(msg) => GitLabError::InvalidResponse(r(msg)),
        }
    }

    /// Error kind tag reported to the caller
    pub const fn kind(&self) -> &'static str {
        match self {
            GitLabError::Authentication { .. } => "AuthenticationError",
            GitLabError::Permission { .. } => "PermissionError",
            GitLabError::NotFound { .. } => "NotFoundError",
            GitLabError::Conflict { .. } => "ConflictError",
            GitLabError::Validation { .. } => "ValidationError",
            GitLabError::RateLimited { .. } => "RateLimitError",
            GitLabError::Upstream { .. } | GitLabError::InvalidResponse(_) => "UpstreamError",
            GitLabError::Connectivity { .. } => "ConnectivityError",
            GitLabError::Http { .. } => "HTTPError",
        }
    }

    /// Suggested next step for the caller
    pub const fn action(&self) -> &'static str {
        match self {
            GitLabError::Authentication { .. } => {
                "Check your GITLAB_TOKEN. Generate a new token at \
                 https://gitlab.com/-/profile/personal_access_tokens"
            }
            GitLabError::Permission { .. } => {
                "Your token does not have permission for this operation. Check token scopes."
            }
            GitLabError::NotFound { .. } => "Verify the resource ID or path is correct.",
            GitLabError::Conflict { .. } => {
                "The resource changed or already exists. Refresh its state and try again."
            }
            GitLabError::Validation { .. } => "Check the request parameters and try again.",
            GitLabError::RateLimited { .. } => {
                "Wait before making more requests. Check rate limit headers."
            }
            GitLabError::Upstream { .. } | GitLabError::InvalidResponse(_) => {
                "The GitLab server encountered an error. Try again later or \
                 contact your GitLab administrator."
            }
            GitLabError::Connectivity { .. } => {
                "Check your network connection and GITLAB_URL setting. \
                 Verify the GitLab instance is accessible."
            }
            GitLabError::Http { .. } => "Check the GitLab API documentation for this endpoint.",
        }
    }

    /// GitLab's explanation, if it gave one
    pub fn details(&self) -> Option<&str> {
        let details = match self {
            GitLabError::Authentication { details }
            | GitLabError::Permission { details }
            | GitLabError::NotFound { details, .. }
            | GitLabError::Conflict { details }
            | GitLabError::Validation { details }
            | GitLabError::RateLimited { details, .. }
            | GitLabError::Upstream { details, .. }
            | GitLabError::Http { details, .. } => details.as_str(),
            GitLabError::Connectivity { reason } => reason.as_str(),
            GitLabError::InvalidResponse(msg) => msg.as_str(),
        };
        (!details.is_empty()).then_some(details)
    }

    /// Whether the same request may succeed if sent again later
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            GitLabError::RateLimited { .. }
                | GitLabError::Upstream { .. }
                | GitLabError::Connectivity { .. }
        )
    }
}

/// Pull the human-readable part out of a GitLab error body.
///
/// GitLab answers with `{"message": "..."}`, `{"message": {"field": ["..."]}}`
/// or `{"error": "...", "error_description": "..."}`; anything else is echoed raw.
/// The secret is masked on the full text, so a cut never splits it.
fn extract_details(body: &str, secret: &str) -> String {
    let body = body.trim();
    let details = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["message", "error_description", "error"]
            .iter()
            .find_map(|key| map.get(*key))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| body.to_string()),
        _ => body.to_string(),
    };
    truncate(&redact(&details, secret), MAX_DETAILS_CHARS)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("GitLab API error: {0}")]
    GitLab(#[from] GitLabError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tool not found: {0}")]
    NotFound(String),
}

impl ToolError {
    /// Errors about the request itself rather than its execution
    pub const fn is_protocol_error(&self) -> bool {
        matches!(self, ToolError::NotFound(_) | ToolError::InvalidArguments(_))
    }

    /// Error kind tag reported to the caller
    pub const fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidArguments(_) => "InvalidArguments",
            ToolError::Validation(e) => e.kind.as_str(),
            ToolError::GitLab(e) => e.kind(),
            ToolError::Serialization(_) => "SerializationError",
            ToolError::NotFound(_) => "ToolNotFound",
        }
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authentication configured")]
    NotConfigured,

    #[error("Invalid token format")]
    InvalidToken,
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for tool operations
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Result type alias for GitLab API operations
pub type GitLabResult<T> = std::result::Result<T, GitLabError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(400, "ValidationError")]
    #[case(401, "AuthenticationError")]
    #[case(403, "PermissionError")]
    #[case(404, "NotFoundError")]
    #[case(409, "ConflictError")]
    #[case(422, "ValidationError")]
    #[case(429, "RateLimitError")]
    #[case(500, "UpstreamError")]
    #[case(502, "UpstreamError")]
    #[case(503, "UpstreamError")]
    #[case(418, "HTTPError")]
    fn test_status_to_kind(#[case] status: u16, #[case] kind: &str) {
        let err = GitLabError::from_response(status, "", "/projects/1", "");
        assert_eq!(err.kind(), kind);
    }

    #[test]
    fn test_not_found_echoes_resource() {
        let err = GitLabError::from_response(
            404,
            r#"{"message":"404 Project Not Found"}"#,
            "/projects/group%2Fmissing",
            "",
        );
        assert!(err.to_string().contains("/projects/group%2Fmissing"));
        assert_eq!(err.details(), Some("404 Project Not Found"));
    }

    #[test]
    fn test_validation_details_from_field_messages() {
        let err = GitLabError::from_response(
            422,
            r#"{"message":{"name":["has already been taken"]}}"#,
            "/projects",
            "",
        );
        let details = err.details().unwrap();
        assert!(details.contains("has already been taken"));
    }

    #[test]
    fn test_oauth_style_error_body() {
        let err = GitLabError::from_response(
            401,
            r#"{"error":"invalid_token","error_description":"Token was revoked"}"#,
            "/user",
            "",
        );
        assert_eq!(err.details(), Some("Token was revoked"));
    }

    #[test]
    fn test_plain_text_body_echoed() {
        let err = GitLabError::from_response(502, "Bad Gateway", "/projects", "");
        assert_eq!(err.details(), Some("Bad Gateway"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_empty_body_has_no_details() {
        let err = GitLabError::from_response(403, "", "/projects/1", "");
        assert_eq!(err.details(), None);
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "x".repeat(2000);
        let err = GitLabError::from_response(500, &body, "/projects", "");
        assert!(err.details().unwrap().len() < 600);
    }

    #[test]
    fn test_validation_message_scrubbed() {
        let err = GitLabError::from_response(
            422,
            r#"{"message":"token glpat-abcdefgh12345678 is not allowed here"}"#,
            "/projects",
            "",
        );
        let details = err.details().unwrap();
        assert!(!details.contains("glpat-abcdefgh12345678"));
        assert!(details.contains("[REDACTED]"));
    }

    #[test]
    fn test_redact_configured_token() {
        let err = GitLabError::from_response(
            401,
            r#"{"message":"token my-legacy-token is invalid"}"#,
            "/user",
            "my-legacy-token",
        );
        assert!(!err.details().unwrap().contains("my-legacy-token"));
        assert!(!err.to_string().contains("my-legacy-token"));
    }

    #[test]
    fn test_secret_across_truncation_point_is_masked() {
        let secret = "Zq8vR3mK1pX7tY2wN5bH";
        let body = serde_json::json!({
            "message": format!("{}{} rejected", "x".repeat(490), secret)
        })
        .to_string();

        let err = GitLabError::from_response(401, &body, "/user", secret);
        let details = err.details().unwrap();
        assert!(!details.contains("Zq8vR3mK1p"));
        assert!(details.contains("[REDACTED]"));
    }

    #[test]
    fn test_retry_after() {
        let err = GitLabError::from_response(429, "", "/projects", "");
        assert!(matches!(
            err,
            GitLabError::RateLimited {
                retry_after: DEFAULT_RETRY_AFTER_SECS,
                ..
            }
        ));

        let err = err.with_retry_after(Some(17));
        assert!(matches!(err, GitLabError::RateLimited { retry_after: 17, .. }));

        let err = GitLabError::from_response(500, "", "/projects", "").with_retry_after(Some(5));
        assert!(matches!(err, GitLabError::Upstream { status: 500, .. }));
    }

    #[test]
    fn test_tool_error_classification() {
        assert!(ToolError::NotFound("x".into()).is_protocol_error());
        assert!(ToolError::InvalidArguments("x".into()).is_protocol_error());

        let validation = ToolError::from(ValidationError::pagination("per_page", "too big"));
        assert!(!validation.is_protocol_error());
        assert_eq!(validation.kind(), "InvalidPagination");

        let upstream = ToolError::from(GitLabError::from_response(409, "", "/x", ""));
        assert!(!upstream.is_protocol_error());
        assert_eq!(upstream.kind(), "ConflictError");
    }
}
