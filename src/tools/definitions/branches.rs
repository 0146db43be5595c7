//! Branch tools
//!
//! Tools for managing repository branches. Branch names may contain `/`,
//! so they are URL-encoded before being placed in a path.

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::project_id;
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

/// List repository branches
#[gitlab_tool(
    name = "list_branches",
    description = "List branches in a repository with optional search",
    category = "branches",
    operation = "read"
)]
pub struct ListBranches {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Search for branches matching this string
    #[serde(default)]
    pub search: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of branches per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListBranches {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional_text("search", self.search.as_deref())
            .build();

        let endpoint = format!("/projects/{}/repository/branches{}", project, query);
        ctx.list(&endpoint, Some(ResourceType::Branch), &fields, pagination)
            .await
    }
}

/// Get a specific branch
#[gitlab_tool(
    name = "get_branch",
    description = "Get information about a specific branch",
    category = "branches",
    operation = "read"
)]
pub struct GetBranch {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Branch name
    pub branch: String,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetBranch {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let branch = validation::reference("branch", &self.branch)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let endpoint = format!(
            "/projects/{}/repository/branches/{}",
            project,
            urlencoding::encode(&branch)
        );
        ctx.fetch(&endpoint, Some(ResourceType::Branch), &fields)
            .await
    }
}

/// Create a new branch
#[gitlab_tool(
    name = "create_branch",
    description = "Create a new branch from a ref (branch, tag, or commit)",
    category = "branches",
    operation = "write"
)]
pub struct CreateBranch {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Name of the new branch
    pub branch: String,
    /// Branch name, tag or commit SHA to branch from
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateBranch {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let branch = validation::reference("branch", &self.branch)?;
        let ref_name = validation::reference("ref", &self.ref_name)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let body = json!({
            "branch": branch,
            "ref": ref_name,
        });

        let endpoint = format!("/projects/{}/repository/branches", project);
        let result: Value = ctx.gitlab.post(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::Branch), result, &fields)
    }
}

/// Delete a branch
#[gitlab_tool(
    name = "delete_branch",
    description = "Delete a branch from the repository",
    category = "branches",
    operation = "delete"
)]
pub struct DeleteBranch {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Branch name to delete
    pub branch: String,
}

#[async_trait]
impl ToolExecutor for DeleteBranch {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let branch = validation::reference("branch", &self.branch)?;

        let endpoint = format!(
            "/projects/{}/repository/branches/{}",
            project,
            urlencoding::encode(&branch)
        );
        ctx.gitlab.delete(&endpoint).await?;

        ToolOutput::success(format!(
            "Branch '{}' deleted successfully from project {}",
            branch,
            project.label()
        ))
    }
}
