//! Issue tools
//!
//! Tools for listing, reading, creating and updating issues and their
//! comments.

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::{insert_some, project_id};
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput, PathOrId};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

const ISSUE_STATES: &[&str] = &["opened", "closed", "all"];
const STATE_EVENTS: &[&str] = &["close", "reopen"];

fn issue_endpoint(project: &PathOrId, issue_iid: u64) -> String {
    format!("/projects/{}/issues/{}", project, issue_iid)
}

/// Set the state of an issue through `state_event`
async fn change_state(
    ctx: &ToolContext,
    project: &IdInput,
    issue_iid: i64,
    state_event: &str,
    include_fields: Option<&str>,
) -> Result<ToolOutput, ToolError> {
    let project = project_id(project)?;
    let issue_iid = validation::positive_id("issue_iid", issue_iid)?;
    let fields = validation::include_fields(include_fields)?;

    let body = json!({ "state_event": state_event });
    let result: Value = ctx
        .gitlab
        .put(&issue_endpoint(&project, issue_iid), &body)
        .await?;
    ToolOutput::shaped(Some(ResourceType::Issue), result, &fields)
}

/// List issues in a project
#[gitlab_tool(
    name = "list_issues",
    description = "List issues in a GitLab project with pagination and filtering",
    category = "issues",
    operation = "read"
)]
pub struct ListIssues {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Filter by state: opened, closed or all
    #[serde(default)]
    pub state: Option<String>,
    /// Comma-separated label names to filter by
    #[serde(default)]
    pub labels: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of issues per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListIssues {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let state = validation::one_of("state", self.state.as_deref(), ISSUE_STATES)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional("state", state)
            .optional_text("labels", self.labels.as_deref())
            .build();

        let endpoint = format!("/projects/{}/issues{}", project, query);
        ctx.list(&endpoint, Some(ResourceType::Issue), &fields, pagination)
            .await
    }
}

/// Get a single issue
#[gitlab_tool(
    name = "get_issue",
    description = "Get details of a specific issue in a GitLab project",
    category = "issues",
    operation = "read"
)]
pub struct GetIssue {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Issue IID (project-scoped number)
    pub issue_iid: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetIssue {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let issue_iid = validation::positive_id("issue_iid", self.issue_iid)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        ctx.fetch(
            &issue_endpoint(&project, issue_iid),
            Some(ResourceType::Issue),
            &fields,
        )
        .await
    }
}

/// Create an issue
#[gitlab_tool(
    name = "create_issue",
    description = "Create a new issue in a GitLab project",
    category = "issues",
    operation = "write"
)]
pub struct CreateIssue {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Issue title
    pub title: String,
    /// Issue description (Markdown)
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated label names
    #[serde(default)]
    pub labels: Option<String>,
    /// User IDs to assign
    #[serde(default)]
    pub assignee_ids: Option<Vec<i64>>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateIssue {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let title = validation::non_empty("title", &self.title)?;
        let assignee_ids = assignees(self.assignee_ids.as_deref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({ "title": title });
        insert_some(
            &mut body,
            "description",
            self.description.as_deref().filter(|d| !d.is_empty()),
        );
        insert_some(
            &mut body,
            "labels",
            self.labels.as_deref().filter(|l| !l.is_empty()),
        );
        insert_some(&mut body, "assignee_ids", assignee_ids.filter(|a| !a.is_empty()));

        let endpoint = format!("/projects/{}/issues", project);
        let result: Value = ctx.gitlab.post(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::Issue), result, &fields)
    }
}

/// Update an issue
#[gitlab_tool(
    name = "update_issue",
    description = "Update an existing issue (title, description, labels, assignees, state)",
    category = "issues",
    operation = "write"
)]
pub struct UpdateIssue {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Issue IID
    pub issue_iid: i64,
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated label names (replaces existing labels)
    #[serde(default)]
    pub labels: Option<String>,
    /// User IDs to assign (replaces existing assignees)
    #[serde(default)]
    pub assignee_ids: Option<Vec<i64>>,
    /// State event: close or reopen
    #[serde(default)]
    pub state_event: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for UpdateIssue {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let issue_iid = validation::positive_id("issue_iid", self.issue_iid)?;
        let title = self
            .title
            .as_deref()
            .map(|t| validation::non_empty("title", t))
            .transpose()?;
        let assignee_ids = assignees(self.assignee_ids.as_deref())?;
        let state_event =
            validation::one_of("state_event", self.state_event.as_deref(), STATE_EVENTS)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({});
        insert_some(&mut body, "title", title);
        insert_some(&mut body, "description", self.description.as_deref());
        insert_some(&mut body, "labels", self.labels.as_deref());
        insert_some(&mut body, "assignee_ids", assignee_ids);
        insert_some(&mut body, "state_event", state_event);

        let result: Value = ctx
            .gitlab
            .put(&issue_endpoint(&project, issue_iid), &body)
            .await?;
        ToolOutput::shaped(Some(ResourceType::Issue), result, &fields)
    }
}

/// Close an issue
#[gitlab_tool(
    name = "close_issue",
    description = "Close an issue in a GitLab project",
    category = "issues",
    operation = "write"
)]
pub struct CloseIssue {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Issue IID
    pub issue_iid: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CloseIssue {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        change_state(
            ctx,
            &self.project_id,
            self.issue_iid,
            "close",
            self.include_fields.as_deref(),
        )
        .await
    }
}

/// Reopen an issue
#[gitlab_tool(
    name = "reopen_issue",
    description = "Reopen a closed issue in a GitLab project",
    category = "issues",
    operation = "write"
)]
pub struct ReopenIssue {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Issue IID
    pub issue_iid: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ReopenIssue {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        change_state(
            ctx,
            &self.project_id,
            self.issue_iid,
            "reopen",
            self.include_fields.as_deref(),
        )
        .await
    }
}

/// Comment on an issue
#[gitlab_tool(
    name = "add_issue_comment",
    description = "Add a comment to an issue",
    category = "issues",
    operation = "write"
)]
pub struct AddIssueComment {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Issue IID
    pub issue_iid: i64,
    /// Comment text (Markdown)
    pub body: String,
}

#[async_trait]
impl ToolExecutor for AddIssueComment {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let issue_iid = validation::positive_id("issue_iid", self.issue_iid)?;
        let text = validation::non_empty("body", &self.body)?;

        let endpoint = format!("{}/notes", issue_endpoint(&project, issue_iid));
        let result: Value = ctx.gitlab.post(&endpoint, &json!({ "body": text })).await?;
        ToolOutput::json_value(result)
    }
}

/// List issue comments
#[gitlab_tool(
    name = "list_issue_comments",
    description = "List comments on an issue",
    category = "issues",
    operation = "read"
)]
pub struct ListIssueComments {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Issue IID
    pub issue_iid: i64,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of comments per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all" (default: all)
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListIssueComments {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let issue_iid = validation::positive_id("issue_iid", self.issue_iid)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new().page(pagination).build();
        let endpoint = format!("{}/notes{}", issue_endpoint(&project, issue_iid), query);
        ctx.list(&endpoint, None, &fields, pagination).await
    }
}

fn assignees(ids: Option<&[i64]>) -> Result<Option<Vec<u64>>, ToolError> {
    ids.map(|ids| {
        ids.iter()
            .map(|id| validation::positive_id("assignee_ids", *id))
            .collect::<Result<Vec<_>, _>>()
    })
    .transpose()
    .map_err(ToolError::from)
}
