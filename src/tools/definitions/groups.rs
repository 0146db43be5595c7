//! Group tools
//!
//! Tools for listing and managing groups and their members.

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::{group_id, insert_some};
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

/// List groups
#[gitlab_tool(
    name = "list_groups",
    description = "List groups visible to the current user, with optional search",
    category = "groups",
    operation = "read"
)]
pub struct ListGroups {
    /// Search groups by name or path
    #[serde(default)]
    pub search: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of groups per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListGroups {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional_text("search", self.search.as_deref())
            .build();

        let endpoint = format!("/groups{}", query);
        ctx.list(&endpoint, Some(ResourceType::Group), &fields, pagination)
            .await
    }
}

/// Get a group
#[gitlab_tool(
    name = "get_group",
    description = "Get details of a specific group",
    category = "groups",
    operation = "read"
)]
pub struct GetGroup {
    /// Group ID or URL-encoded path
    pub group_id: IdInput,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetGroup {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let group = group_id(&self.group_id)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let endpoint = format!("/groups/{}", group);
        ctx.fetch(&endpoint, Some(ResourceType::Group), &fields)
            .await
    }
}

/// Create a group
#[gitlab_tool(
    name = "create_group",
    description = "Create a new group",
    category = "groups",
    operation = "write"
)]
pub struct CreateGroup {
    /// Group name
    pub name: String,
    /// Group path (URL slug)
    pub path: String,
    /// Group description
    #[serde(default)]
    pub description: Option<String>,
    /// Visibility: private, internal or public (default: private)
    #[serde(default)]
    pub visibility: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateGroup {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let name = validation::non_empty("name", &self.name)?;
        let path = validation::non_empty("path", &self.path)?;
        let visibility = validation::visibility(self.visibility.as_deref())?
            .unwrap_or_else(|| "private".to_string());
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({
            "name": name,
            "path": path,
            "visibility": visibility,
        });
        insert_some(
            &mut body,
            "description",
            self.description.as_deref().filter(|d| !d.is_empty()),
        );

        let result: Value = ctx.gitlab.post("/groups", &body).await?;
        ToolOutput::shaped(Some(ResourceType::Group), result, &fields)
    }
}

/// Update a group
#[gitlab_tool(
    name = "update_group",
    description = "Update a group's name, path, description or visibility",
    category = "groups",
    operation = "write"
)]
pub struct UpdateGroup {
    /// Group ID or URL-encoded path
    pub group_id: IdInput,
    /// New group name
    #[serde(default)]
    pub name: Option<String>,
    /// New group path
    #[serde(default)]
    pub path: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New visibility: private, internal or public
    #[serde(default)]
    pub visibility: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for UpdateGroup {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let group = group_id(&self.group_id)?;
        let name = self
            .name
            .as_deref()
            .map(|n| validation::non_empty("name", n))
            .transpose()?;
        let path = self
            .path
            .as_deref()
            .map(|p| validation::non_empty("path", p))
            .transpose()?;
        let visibility = validation::visibility(self.visibility.as_deref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({});
        insert_some(&mut body, "name", name);
        insert_some(&mut body, "path", path);
        insert_some(&mut body, "description", self.description.as_deref());
        insert_some(&mut body, "visibility", visibility);

        let endpoint = format!("/groups/{}", group);
        let result: Value = ctx.gitlab.put(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::Group), result, &fields)
    }
}

/// Delete a group
#[gitlab_tool(
    name = "delete_group",
    description = "Delete a group",
    category = "groups",
    operation = "delete"
)]
pub struct DeleteGroup {
    /// Group ID or URL-encoded path
    pub group_id: IdInput,
}

#[async_trait]
impl ToolExecutor for DeleteGroup {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let group = group_id(&self.group_id)?;

        let endpoint = format!("/groups/{}", group);
        ctx.gitlab.delete(&endpoint).await?;

        ToolOutput::success(format!("Group {} deleted successfully", group.label()))
    }
}

/// List group members
#[gitlab_tool(
    name = "list_group_members",
    description = "List the direct members of a group",
    category = "groups",
    operation = "read"
)]
pub struct ListGroupMembers {
    /// Group ID or URL-encoded path
    pub group_id: IdInput,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of members per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListGroupMembers {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let group = group_id(&self.group_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new().page(pagination).build();
        let endpoint = format!("/groups/{}/members{}", group, query);
        ctx.list(&endpoint, Some(ResourceType::User), &fields, pagination)
            .await
    }
}

/// Add a group member
#[gitlab_tool(
    name = "add_group_member",
    description = "Add a user to a group with an access level \
                   (10 guest, 20 reporter, 30 developer, 40 maintainer, 50 owner)",
    category = "groups",
    operation = "write"
)]
pub struct AddGroupMember {
    /// Group ID or URL-encoded path
    pub group_id: IdInput,
    /// User ID to add
    pub user_id: i64,
    /// Access level: 10, 20, 30, 40 or 50 (default: 30)
    #[serde(default)]
    pub access_level: Option<i64>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for AddGroupMember {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let group = group_id(&self.group_id)?;
        let user_id = validation::positive_id("user_id", self.user_id)?;
        let access_level = validation::access_level(self.access_level)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let body = json!({
            "user_id": user_id,
            "access_level": access_level,
        });

        let endpoint = format!("/groups/{}/members", group);
        let result: Value = ctx.gitlab.post(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::User), result, &fields)
    }
}
