//! User tools

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IntInput};
use async_trait::async_trait;

use gitlab_mcp_macros::gitlab_tool;

/// Get the current user
#[gitlab_tool(
    name = "get_current_user",
    description = "Get the user the access token belongs to",
    category = "users",
    operation = "read"
)]
pub struct GetCurrentUser {
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetCurrentUser {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let fields = validation::include_fields(self.include_fields.as_deref())?;
        ctx.fetch("/user", Some(ResourceType::User), &fields).await
    }
}

/// Get a user
#[gitlab_tool(
    name = "get_user",
    description = "Get details of a specific user",
    category = "users",
    operation = "read"
)]
pub struct GetUser {
    /// User ID
    pub user_id: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetUser {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let user_id = validation::positive_id("user_id", self.user_id)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let endpoint = format!("/users/{}", user_id);
        ctx.fetch(&endpoint, Some(ResourceType::User), &fields)
            .await
    }
}

/// List users
#[gitlab_tool(
    name = "list_users",
    description = "List users",
    category = "users",
    operation = "read"
)]
pub struct ListUsers {
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of users per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListUsers {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new().page(pagination).build();
        let endpoint = format!("/users{}", query);
        ctx.list(&endpoint, Some(ResourceType::User), &fields, pagination)
            .await
    }
}

/// Search users
#[gitlab_tool(
    name = "search_users",
    description = "Search users by username, name or email",
    category = "users",
    operation = "read"
)]
pub struct SearchUsers {
    /// Search query
    pub search: String,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of users per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for SearchUsers {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let search = validation::non_empty("search", &self.search)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .param("search", search)
            .page(pagination)
            .build();
        let endpoint = format!("/users{}", query);
        ctx.list(&endpoint, Some(ResourceType::User), &fields, pagination)
            .await
    }
}
