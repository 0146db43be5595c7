//! Tool execution framework
//!
//! Defines the traits every tool implements and the context and output
//! types that flow through a tool call.

use crate::error::ToolError;
use crate::gitlab::GitLabClient;
use crate::response::{self, FieldSelection, ResourceType};
use crate::tools::category::{OperationType, ToolCategory};
use crate::validation::Pagination;
// async_trait required for dyn-compatibility with Box<dyn ToolHandler>
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Static metadata about a tool, generated by `#[gitlab_tool]`
pub trait ToolInfo {
    fn name() -> &'static str;
    fn description() -> &'static str;
    fn category() -> ToolCategory;
    fn operation_type() -> OperationType;
}

/// A tool that can run against GitLab
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError>;
}

/// Per-call context handed to a tool
#[derive(Clone)]
pub struct ToolContext {
    /// Shared GitLab client
    pub gitlab: Arc<GitLabClient>,
    /// Request ID for correlating log lines
    pub request_id: String,
}

impl ToolContext {
    pub fn new(gitlab: Arc<GitLabClient>, request_id: impl Into<String>) -> Self {
        Self {
            gitlab,
            request_id: request_id.into(),
        }
    }

    /// Fetch one page of a list endpoint and shape it into a list envelope.
    ///
    /// `endpoint` must already carry the `page`/`per_page` query parameters.
    pub async fn list(
        &self,
        endpoint: &str,
        resource: Option<ResourceType>,
        selection: &FieldSelection,
        pagination: Pagination,
    ) -> Result<ToolOutput, ToolError> {
        let (items, headers) = self.gitlab.get_page(endpoint).await?;
        let envelope = response::shape_list(resource, items, selection, pagination, &headers);
        ToolOutput::json(&envelope)
    }

    /// Fetch a single resource and filter its fields.
    pub async fn fetch(
        &self,
        endpoint: &str,
        resource: Option<ResourceType>,
        selection: &FieldSelection,
    ) -> Result<ToolOutput, ToolError> {
        let body: Value = self.gitlab.get(endpoint).await?;
        ToolOutput::shaped(resource, body, selection)
    }
}

/// A piece of tool output content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
}

/// Successful result of a tool call.
///
/// Failures never take this shape; they stay a [`ToolError`] until the MCP
/// boundary turns them into an error result.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: Vec<ContentBlock>,
    /// The JSON value behind the text content
    pub structured: Option<Value>,
}

impl ToolOutput {
    /// Pretty-printed JSON output
    pub fn json_value(value: Value) -> Result<Self, ToolError> {
        let text = serde_json::to_string_pretty(&value)?;
        Ok(Self {
            content: vec![ContentBlock::Text { text }],
            structured: Some(value),
        })
    }

    /// Serialize `value` as JSON output
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ToolError> {
        Self::json_value(serde_json::to_value(value)?)
    }

    /// Filter a resource body, then output it as JSON
    pub fn shaped(
        resource: Option<ResourceType>,
        body: Value,
        selection: &FieldSelection,
    ) -> Result<Self, ToolError> {
        Self::json_value(response::shape(resource, body, selection))
    }

    /// Confirmation for an operation that returns no body
    pub fn success(message: impl Into<String>) -> Result<Self, ToolError> {
        Self::json_value(json!({
            "success": true,
            "message": message.into(),
        }))
    }
}
