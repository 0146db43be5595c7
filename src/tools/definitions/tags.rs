//! Tag tools
//!
//! Tags have no default field table; they are returned whole unless
//! `include_fields` narrows them.

use crate::error::ToolError;
use crate::tools::definitions::{insert_some, project_id};
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

/// List repository tags
#[gitlab_tool(
    name = "list_tags",
    description = "List tags in a repository with optional search",
    category = "tags",
    operation = "read"
)]
pub struct ListTags {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Search for tags matching this string
    #[serde(default)]
    pub search: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of tags per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all" (default: all)
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListTags {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional_text("search", self.search.as_deref())
            .build();

        let endpoint = format!("/projects/{}/repository/tags{}", project, query);
        ctx.list(&endpoint, None, &fields, pagination).await
    }
}

/// Create a tag
#[gitlab_tool(
    name = "create_tag",
    description = "Create a tag from a branch, tag or commit, optionally annotated",
    category = "tags",
    operation = "write"
)]
pub struct CreateTag {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Name of the new tag
    pub tag_name: String,
    /// Branch name, tag or commit SHA to tag
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Annotation message (creates an annotated tag)
    #[serde(default)]
    pub message: Option<String>,
    /// Comma-separated fields to include, or "all" (default: all)
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateTag {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let tag_name = validation::reference("tag_name", &self.tag_name)?;
        let ref_name = validation::reference("ref", &self.ref_name)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({
            "tag_name": tag_name,
            "ref": ref_name,
        });
        insert_some(
            &mut body,
            "message",
            self.message.as_deref().filter(|m| !m.is_empty()),
        );

        let endpoint = format!("/projects/{}/repository/tags", project);
        let result: Value = ctx.gitlab.post(&endpoint, &body).await?;
        ToolOutput::shaped(None, result, &fields)
    }
}
