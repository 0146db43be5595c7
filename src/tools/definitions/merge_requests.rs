//! Merge request tools
//!
//! Tools for working with merge requests: listing, creating, updating,
//! merging, approving, reading diffs and comments.

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::{insert_some, project_id};
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput, PathOrId};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

const MR_STATES: &[&str] = &["opened", "closed", "merged", "all"];
const STATE_EVENTS: &[&str] = &["close", "reopen"];

fn mr_endpoint(project: &PathOrId, mr_iid: u64) -> String {
    format!("/projects/{}/merge_requests/{}", project, mr_iid)
}

/// List merge requests in a project
#[gitlab_tool(
    name = "list_merge_requests",
    description = "List merge requests in a GitLab project with pagination and state filter",
    category = "merge_requests",
    operation = "read"
)]
pub struct ListMergeRequests {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Filter by state: opened, closed, merged or all
    #[serde(default)]
    pub state: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of merge requests per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListMergeRequests {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let state = validation::one_of("state", self.state.as_deref(), MR_STATES)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional("state", state)
            .build();

        let endpoint = format!("/projects/{}/merge_requests{}", project, query);
        ctx.list(
            &endpoint,
            Some(ResourceType::MergeRequest),
            &fields,
            pagination,
        )
        .await
    }
}

/// Get a merge request
#[gitlab_tool(
    name = "get_merge_request",
    description = "Get details of a specific merge request",
    category = "merge_requests",
    operation = "read"
)]
pub struct GetMergeRequest {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Merge request IID
    pub mr_iid: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetMergeRequest {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let mr_iid = validation::positive_id("mr_iid", self.mr_iid)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        ctx.fetch(
            &mr_endpoint(&project, mr_iid),
            Some(ResourceType::MergeRequest),
            &fields,
        )
        .await
    }
}

/// Create a merge request
#[gitlab_tool(
    name = "create_merge_request",
    description = "Create a new merge request from a source branch into a target branch",
    category = "merge_requests",
    operation = "write"
)]
pub struct CreateMergeRequest {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Branch containing the changes
    pub source_branch: String,
    /// Branch to merge into
    pub target_branch: String,
    /// Merge request title
    pub title: String,
    /// Merge request description (Markdown)
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateMergeRequest {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let source_branch = validation::reference("source_branch", &self.source_branch)?;
        let target_branch = validation::reference("target_branch", &self.target_branch)?;
        let title = validation::non_empty("title", &self.title)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({
            "source_branch": source_branch,
            "target_branch": target_branch,
            "title": title,
        });
        insert_some(
            &mut body,
            "description",
            self.description.as_deref().filter(|d| !d.is_empty()),
        );

        let endpoint = format!("/projects/{}/merge_requests", project);
        let result: Value = ctx.gitlab.post(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::MergeRequest), result, &fields)
    }
}

/// Update a merge request
#[gitlab_tool(
    name = "update_merge_request",
    description = "Update a merge request's title, description, target branch or state",
    category = "merge_requests",
    operation = "write"
)]
pub struct UpdateMergeRequest {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Merge request IID
    pub mr_iid: i64,
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New target branch
    #[serde(default)]
    pub target_branch: Option<String>,
    /// State event: close or reopen
    #[serde(default)]
    pub state_event: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for UpdateMergeRequest {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let mr_iid = validation::positive_id("mr_iid", self.mr_iid)?;
        let title = self
            .title
            .as_deref()
            .map(|t| validation::non_empty("title", t))
            .transpose()?;
        let target_branch =
            validation::optional_reference("target_branch", self.target_branch.as_deref())?;
        let state_event =
            validation::one_of("state_event", self.state_event.as_deref(), STATE_EVENTS)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({});
        insert_some(&mut body, "title", title);
        insert_some(&mut body, "description", self.description.as_deref());
        insert_some(&mut body, "target_branch", target_branch);
        insert_some(&mut body, "state_event", state_event);

        let result: Value = ctx.gitlab.put(&mr_endpoint(&project, mr_iid), &body).await?;
        ToolOutput::shaped(Some(ResourceType::MergeRequest), result, &fields)
    }
}

/// Merge a merge request
#[gitlab_tool(
    name = "merge_merge_request",
    description = "Merge an open merge request",
    category = "merge_requests",
    operation = "execute"
)]
pub struct MergeMergeRequest {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Merge request IID
    pub mr_iid: i64,
    /// Custom merge commit message
    #[serde(default)]
    pub merge_commit_message: Option<String>,
    /// Comma-separated fields to include, or "all" (default: all)
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for MergeMergeRequest {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let mr_iid = validation::positive_id("mr_iid", self.mr_iid)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({});
        insert_some(
            &mut body,
            "merge_commit_message",
            self.merge_commit_message
                .as_deref()
                .filter(|m| !m.trim().is_empty()),
        );

        let endpoint = format!("{}/merge", mr_endpoint(&project, mr_iid));
        let result: Value = ctx.gitlab.put(&endpoint, &body).await?;
        ToolOutput::shaped(None, result, &fields)
    }
}

/// Approve a merge request
#[gitlab_tool(
    name = "approve_merge_request",
    description = "Approve a merge request as the current user",
    category = "merge_requests",
    operation = "write"
)]
pub struct ApproveMergeRequest {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Merge request IID
    pub mr_iid: i64,
}

#[async_trait]
impl ToolExecutor for ApproveMergeRequest {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let mr_iid = validation::positive_id("mr_iid", self.mr_iid)?;

        let endpoint = format!("{}/approve", mr_endpoint(&project, mr_iid));
        let result: Value = ctx.gitlab.post_empty(&endpoint).await?;
        ToolOutput::json_value(result)
    }
}

/// Get merge request changes
#[gitlab_tool(
    name = "get_merge_request_changes",
    description = "Get the changed files and diffs of a merge request",
    category = "merge_requests",
    operation = "read"
)]
pub struct GetMergeRequestChanges {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Merge request IID
    pub mr_iid: i64,
    /// Comma-separated fields to include, or "all" (default: all)
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetMergeRequestChanges {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let mr_iid = validation::positive_id("mr_iid", self.mr_iid)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let endpoint = format!("{}/changes", mr_endpoint(&project, mr_iid));
        ctx.fetch(&endpoint, None, &fields).await
    }
}

/// Comment on a merge request
#[gitlab_tool(
    name = "add_merge_request_comment",
    description = "Add a comment to a merge request",
    category = "merge_requests",
    operation = "write"
)]
pub struct AddMergeRequestComment {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Merge request IID
    pub mr_iid: i64,
    /// Comment text (Markdown)
    pub body: String,
}

#[async_trait]
impl ToolExecutor for AddMergeRequestComment {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let mr_iid = validation::positive_id("mr_iid", self.mr_iid)?;
        let text = validation::non_empty("body", &self.body)?;

        let endpoint = format!("{}/notes", mr_endpoint(&project, mr_iid));
        let result: Value = ctx.gitlab.post(&endpoint, &json!({ "body": text })).await?;
        ToolOutput::json_value(result)
    }
}

/// List merge request comments
#[gitlab_tool(
    name = "list_merge_request_comments",
    description = "List comments on a merge request",
    category = "merge_requests",
    operation = "read"
)]
pub struct ListMergeRequestComments {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Merge request IID
    pub mr_iid: i64,
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
impl ToolExecutor for ListMergeRequestComments {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let mr_iid = validation::positive_id("mr_iid", self.mr_iid)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new().page(pagination).build();
        let endpoint = format!("{}/notes{}", mr_endpoint(&project, mr_iid), query);
        ctx.list(&endpoint, None, &fields, pagination).await
    }
}
