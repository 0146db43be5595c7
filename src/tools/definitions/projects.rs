//! Project tools
//!
//! Tools for listing, reading and managing projects.

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::{insert_some, project_id};
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

/// List projects
#[gitlab_tool(
    name = "list_projects",
    description = "List GitLab projects with pagination and optional search",
    category = "projects",
    operation = "read"
)]
pub struct ListProjects {
    /// Search projects by name or path
    #[serde(default)]
    pub search: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of projects per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListProjects {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional_text("search", self.search.as_deref())
            .build();

        let endpoint = format!("/projects{}", query);
        ctx.list(&endpoint, Some(ResourceType::Project), &fields, pagination)
            .await
    }
}

/// Get a project
#[gitlab_tool(
    name = "get_project",
    description = "Get details of a specific GitLab project",
    category = "projects",
    operation = "read"
)]
pub struct GetProject {
    /// Project ID or URL-encoded path (e.g. "group/project")
    pub project_id: IdInput,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetProject {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let endpoint = format!("/projects/{}", project);
        ctx.fetch(&endpoint, Some(ResourceType::Project), &fields)
            .await
    }
}

/// Create a project
#[gitlab_tool(
    name = "create_project",
    description = "Create a new GitLab project",
    category = "projects",
    operation = "write"
)]
pub struct CreateProject {
    /// Project name
    pub name: String,
    /// Project description
    #[serde(default)]
    pub description: Option<String>,
    /// Visibility: private, internal or public (default: private)
    #[serde(default)]
    pub visibility: Option<String>,
    /// Create an initial README commit
    #[serde(default)]
    pub initialize_with_readme: bool,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateProject {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let name = validation::non_empty("name", &self.name)?;
        let visibility = validation::visibility(self.visibility.as_deref())?
            .unwrap_or_else(|| "private".to_string());
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({
            "name": name,
            "visibility": visibility,
            "initialize_with_readme": self.initialize_with_readme,
        });
        insert_some(
            &mut body,
            "description",
            self.description.as_deref().filter(|d| !d.is_empty()),
        );

        let result: Value = ctx.gitlab.post("/projects", &body).await?;
        ToolOutput::shaped(Some(ResourceType::Project), result, &fields)
    }
}

/// Update a project
#[gitlab_tool(
    name = "update_project",
    description = "Update an existing GitLab project's settings",
    category = "projects",
    operation = "write"
)]
pub struct UpdateProject {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// New project name
    #[serde(default)]
    pub name: Option<String>,
    /// New project description
    #[serde(default)]
    pub description: Option<String>,
    /// New visibility: private, internal or public
    #[serde(default)]
    pub visibility: Option<String>,
    /// New default branch
    #[serde(default)]
    pub default_branch: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for UpdateProject {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let name = self
            .name
            .as_deref()
            .map(|n| validation::non_empty("name", n))
            .transpose()?;
        let visibility = validation::visibility(self.visibility.as_deref())?;
        let default_branch =
            validation::optional_reference("default_branch", self.default_branch.as_deref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({});
        insert_some(&mut body, "name", name);
        insert_some(&mut body, "description", self.description.as_deref());
        insert_some(&mut body, "visibility", visibility);
        insert_some(&mut body, "default_branch", default_branch);

        let endpoint = format!("/projects/{}", project);
        let result: Value = ctx.gitlab.put(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::Project), result, &fields)
    }
}

/// Delete a project
#[gitlab_tool(
    name = "delete_project",
    description = "Delete a GitLab project",
    category = "projects",
    operation = "delete"
)]
pub struct DeleteProject {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
}

#[async_trait]
impl ToolExecutor for DeleteProject {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;

        let endpoint = format!("/projects/{}", project);
        ctx.gitlab.delete(&endpoint).await?;

        ToolOutput::success(format!("Project {} deleted successfully", project.label()))
    }
}
