//! Commit tools

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::project_id;
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput};
use async_trait::async_trait;

use gitlab_mcp_macros::gitlab_tool;

/// List commits
#[gitlab_tool(
    name = "list_commits",
    description = "List commits in a repository, optionally for a ref and date range",
    category = "commits",
    operation = "read"
)]
pub struct ListCommits {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Branch, tag or commit SHA to list history from
    #[serde(default)]
    pub ref_name: Option<String>,
    /// Only commits after this date (ISO 8601)
    #[serde(default)]
    pub since: Option<String>,
    /// Only commits before this date (ISO 8601)
    #[serde(default)]
    pub until: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of commits per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListCommits {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let ref_name = validation::optional_reference("ref_name", self.ref_name.as_deref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional("ref_name", ref_name)
            .optional_text("since", self.since.as_deref())
            .optional_text("until", self.until.as_deref())
            .build();

        let endpoint = format!("/projects/{}/repository/commits{}", project, query);
        ctx.list(&endpoint, Some(ResourceType::Commit), &fields, pagination)
            .await
    }
}

/// Get a commit
#[gitlab_tool(
    name = "get_commit",
    description = "Get details of a specific commit",
    category = "commits",
    operation = "read"
)]
pub struct GetCommit {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Commit SHA (or branch/tag name)
    pub sha: String,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetCommit {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let sha = validation::reference("sha", &self.sha)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let endpoint = format!(
            "/projects/{}/repository/commits/{}",
            project,
            urlencoding::encode(&sha)
        );
        ctx.fetch(&endpoint, Some(ResourceType::Commit), &fields)
            .await
    }
}
