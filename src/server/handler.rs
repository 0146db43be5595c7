//! MCP server handler
//!
//! Implements the MCP protocol handler for GitLab tools.

use crate::auth::create_auth_provider;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::error::mcp_mapper::{error_result, map_tool_error};
use crate::gitlab::GitLabClient;
use crate::tools::{
    ContentBlock, OperationType, RegisteredTool, ToolContext, ToolOutput, ToolRegistry,
    definitions,
};
use rmcp::ErrorData as McpError;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeResult,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, Tool,
    ToolAnnotations, ToolsCapability,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const INSTRUCTIONS: &str = "GitLab MCP Server - work with GitLab projects, issues, merge \
requests, pipelines, files, groups, users, labels and milestones. List tools accept \
page/per_page (1-100) and every tool accepts include_fields (comma-separated, or \"all\") \
to choose which fields are returned.";

/// GitLab MCP server handler
#[derive(Clone)]
pub struct GitLabMcpHandler {
    /// Server name for MCP
    name: String,
    /// Server version
    version: String,
    /// Tool registry
    registry: Arc<ToolRegistry>,
    /// GitLab client
    gitlab: Arc<GitLabClient>,
}

impl GitLabMcpHandler {
    /// Create a new handler from configuration
    pub fn new(config: &AppConfig, gitlab: GitLabClient) -> Self {
        Self::new_with_shared(config, Arc::new(gitlab))
    }

    /// Create a new handler with a shared (Arc-wrapped) client
    ///
    /// The HTTP transport creates one handler per session; they all share
    /// the same client and its connection pool.
    pub fn new_with_shared(config: &AppConfig, gitlab: Arc<GitLabClient>) -> Self {
        let mut registry = ToolRegistry::new();
        definitions::register_all_tools(&mut registry);

        info!(tools = registry.len(), "Initialized GitLab MCP handler");

        Self {
            name: config.server.name.clone(),
            version: config.server.version.clone(),
            registry: Arc::new(registry),
            gitlab,
        }
    }

    /// Build the auth provider and client from configuration, then the handler
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let auth = create_auth_provider(&config.gitlab)?;
        let gitlab = GitLabClient::new(&config.gitlab, auth)?;
        Ok(Self::new(config, gitlab))
    }

    /// Get the number of registered tools
    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// Convert internal tool output to MCP result
    fn to_mcp_result(output: ToolOutput) -> CallToolResult {
        let content = output
            .content
            .into_iter()
            .map(|block| match block {
                ContentBlock::Text { text } => Content::text(text),
            })
            .collect();

        CallToolResult {
            content,
            is_error: Some(false),
            meta: None,
            structured_content: output.structured.filter(Value::is_object),
        }
    }

    /// Convert registry tools to MCP tool definitions, sorted by name
    pub fn get_mcp_tools(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self.registry.tools().map(mcp_tool).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Run a tool by name.
    ///
    /// Unknown tools and undecodable arguments are protocol errors; every
    /// other failure becomes a tool result with `is_error` set.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        let request_id = format!("{:016x}", rand::random::<u64>());
        let ctx = ToolContext::new(self.gitlab.clone(), request_id);

        let args = arguments.map(Value::Object).unwrap_or(Value::Null);

        match self.registry.execute(name, &ctx, args).await {
            Ok(output) => Ok(Self::to_mcp_result(output)),
            Err(e) if e.is_protocol_error() => Err(map_tool_error(&e)),
            Err(e) => Ok(error_result(&e)),
        }
    }
}

/// MCP definition of a registered tool
fn mcp_tool(tool: &RegisteredTool) -> Tool {
    // Convert schemars schema to MCP format (JsonObject = Map<String, Value>)
    let schema_value =
        serde_json::to_value(&tool.input_schema).unwrap_or_else(|_| serde_json::json!({}));

    let mut input_schema: Map<String, Value> = Map::new();
    input_schema.insert("type".to_string(), Value::String("object".to_string()));

    for key in ["properties", "required", "$defs"] {
        if let Some(value) = schema_value.get(key) {
            input_schema.insert(key.to_string(), value.clone());
        }
    }
    if !input_schema.contains_key("properties") {
        input_schema.insert("properties".to_string(), Value::Object(Map::new()));
    }

    Tool {
        name: Cow::Borrowed(tool.name),
        description: Some(Cow::Borrowed(tool.description)),
        input_schema: Arc::new(input_schema),
        annotations: Some(annotations(tool.operation)),
        icons: None,
        meta: None,
        output_schema: None,
        title: None,
    }
}

fn annotations(operation: OperationType) -> ToolAnnotations {
    ToolAnnotations {
        read_only_hint: Some(operation.is_read_only()),
        destructive_hint: Some(operation.is_destructive()),
        idempotent_hint: Some(matches!(
            operation,
            OperationType::Read | OperationType::Delete
        )),
        open_world_hint: Some(true),
        ..Default::default()
    }
}

impl ServerHandler for GitLabMcpHandler {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: self.name.clone(),
                version: self.version.clone(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    #[instrument(skip(self, _context))]
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        debug!("Listing tools");
        async move {
            Ok(ListToolsResult {
                tools: self.get_mcp_tools(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    #[instrument(skip(self, request, _context), fields(tool = %request.name))]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        debug!("Calling tool");
        async move { self.call(&request.name, request.arguments).await }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations_follow_operation() {
        let read = annotations(OperationType::Read);
        assert_eq!(read.read_only_hint, Some(true));
        assert_eq!(read.destructive_hint, Some(false));

        let delete = annotations(OperationType::Delete);
        assert_eq!(delete.read_only_hint, Some(false));
        assert_eq!(delete.destructive_hint, Some(true));

        let write = annotations(OperationType::Write);
        assert_eq!(write.destructive_hint, Some(false));
        assert_eq!(write.idempotent_hint, Some(false));
    }

    #[test]
    fn test_to_mcp_result_keeps_object_as_structured() {
        let output = ToolOutput::json_value(serde_json::json!({"id": 1})).unwrap();
        let result = GitLabMcpHandler::to_mcp_result(output);
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content, Some(serde_json::json!({"id": 1})));

        let output = ToolOutput::json_value(serde_json::json!([1, 2])).unwrap();
        let result = GitLabMcpHandler::to_mcp_result(output);
        assert!(result.structured_content.is_none());
        assert_eq!(result.content.len(), 1);
    }
}
