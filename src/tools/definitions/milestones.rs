//! Milestone tools
//!
//! Tools for managing project milestones.

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::{insert_some, project_id};
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput, PathOrId};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

const MILESTONE_STATES: &[&str] = &["active", "closed"];

fn milestone_endpoint(project: &PathOrId, milestone_id: u64) -> String {
    format!("/projects/{}/milestones/{}", project, milestone_id)
}

/// List project milestones
#[gitlab_tool(
    name = "list_milestones",
    description = "List milestones in a project",
    category = "milestones",
    operation = "read"
)]
pub struct ListMilestones {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Filter by state: active or closed
    #[serde(default)]
    pub state: Option<String>,
    /// Search milestones by title
    #[serde(default)]
    pub search: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of milestones per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListMilestones {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let state = validation::one_of("state", self.state.as_deref(), MILESTONE_STATES)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional("state", state)
            .optional_text("search", self.search.as_deref())
            .build();

        let endpoint = format!("/projects/{}/milestones{}", project, query);
        ctx.list(&endpoint, Some(ResourceType::Milestone), &fields, pagination)
            .await
    }
}

/// Create a milestone
#[gitlab_tool(
    name = "create_milestone",
    description = "Create a new milestone in a project",
    category = "milestones",
    operation = "write"
)]
pub struct CreateMilestone {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Milestone title
    pub title: String,
    /// Milestone description
    #[serde(default)]
    pub description: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[serde(default)]
    pub due_date: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateMilestone {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let title = validation::non_empty("title", &self.title)?;
        let due_date = validation::optional_date("due_date", self.due_date.as_deref())?;
        let start_date = validation::optional_date("start_date", self.start_date.as_deref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({ "title": title });
        insert_some(
            &mut body,
            "description",
            self.description.as_deref().filter(|d| !d.is_empty()),
        );
        insert_some(&mut body, "due_date", due_date);
        insert_some(&mut body, "start_date", start_date);

        let endpoint = format!("/projects/{}/milestones", project);
        let result: Value = ctx.gitlab.post(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::Milestone), result, &fields)
    }
}

/// Update a milestone
#[gitlab_tool(
    name = "update_milestone",
    description = "Update a milestone's title, description or dates",
    category = "milestones",
    operation = "write"
)]
pub struct UpdateMilestone {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Milestone ID
    pub milestone_id: i64,
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New due date (YYYY-MM-DD)
    #[serde(default)]
    pub due_date: Option<String>,
    /// New start date (YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for UpdateMilestone {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let milestone_id = validation::positive_id("milestone_id", self.milestone_id)?;
        let title = self
            .title
            .as_deref()
            .map(|t| validation::non_empty("title", t))
            .transpose()?;
        let due_date = validation::optional_date("due_date", self.due_date.as_deref())?;
        let start_date = validation::optional_date("start_date", self.start_date.as_deref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({});
        insert_some(&mut body, "title", title);
        insert_some(&mut body, "description", self.description.as_deref());
        insert_some(&mut body, "due_date", due_date);
        insert_some(&mut body, "start_date", start_date);

        let result: Value = ctx
            .gitlab
            .put(&milestone_endpoint(&project, milestone_id), &body)
            .await?;
        ToolOutput::shaped(Some(ResourceType::Milestone), result, &fields)
    }
}

/// Close a milestone
#[gitlab_tool(
    name = "close_milestone",
    description = "Close a milestone",
    category = "milestones",
    operation = "write"
)]
pub struct CloseMilestone {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Milestone ID
    pub milestone_id: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CloseMilestone {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let milestone_id = validation::positive_id("milestone_id", self.milestone_id)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let body = json!({ "state_event": "close" });
        let result: Value = ctx
            .gitlab
            .put(&milestone_endpoint(&project, milestone_id), &body)
            .await?;
        ToolOutput::shaped(Some(ResourceType::Milestone), result, &fields)
    }
}
