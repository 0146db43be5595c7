//! Job tools
//!
//! Tools for inspecting and controlling the jobs of a pipeline.

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::project_id;
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput, PIPELINE_STATUSES, PathOrId};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

fn job_endpoint(project: &PathOrId, job_id: u64) -> String {
    format!("/projects/{}/jobs/{}", project, job_id)
}

/// POST a job action (`retry`, `cancel`) and shape the returned job
async fn job_action(
    ctx: &ToolContext,
    project: &IdInput,
    job_id: i64,
    action: &str,
    include_fields: Option<&str>,
) -> Result<ToolOutput, ToolError> {
    let project = project_id(project)?;
    let job_id = validation::positive_id("job_id", job_id)?;
    let fields = validation::include_fields(include_fields)?;

    let endpoint = format!("{}/{}", job_endpoint(&project, job_id), action);
    let result: Value = ctx.gitlab.post_empty(&endpoint).await?;
    ToolOutput::shaped(Some(ResourceType::Job), result, &fields)
}

/// List pipeline jobs
#[gitlab_tool(
    name = "list_jobs",
    description = "List the jobs of a pipeline, optionally filtered by scope",
    category = "jobs",
    operation = "read"
)]
pub struct ListJobs {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Pipeline ID
    pub pipeline_id: i64,
    /// Filter by scope: created, pending, running, failed, success, canceled, skipped, manual
    #[serde(default)]
    pub scope: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of jobs per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListJobs {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pipeline_id = validation::positive_id("pipeline_id", self.pipeline_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let scope = validation::one_of("scope", self.scope.as_deref(), PIPELINE_STATUSES)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional("scope", scope)
            .build();

        let endpoint = format!(
            "/projects/{}/pipelines/{}/jobs{}",
            project, pipeline_id, query
        );
        ctx.list(&endpoint, Some(ResourceType::Job), &fields, pagination)
            .await
    }
}

/// Get a job
#[gitlab_tool(
    name = "get_job",
    description = "Get details of a specific job",
    category = "jobs",
    operation = "read"
)]
pub struct GetJob {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Job ID
    pub job_id: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetJob {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let job_id = validation::positive_id("job_id", self.job_id)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        ctx.fetch(
            &job_endpoint(&project, job_id),
            Some(ResourceType::Job),
            &fields,
        )
        .await
    }
}

/// Retry a job
#[gitlab_tool(
    name = "retry_job",
    description = "Retry a single job",
    category = "jobs",
    operation = "execute"
)]
pub struct RetryJob {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Job ID
    pub job_id: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for RetryJob {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        job_action(
            ctx,
            &self.project_id,
            self.job_id,
            "retry",
            self.include_fields.as_deref(),
        )
        .await
    }
}

/// Cancel a job
#[gitlab_tool(
    name = "cancel_job",
    description = "Cancel a running or pending job",
    category = "jobs",
    operation = "execute"
)]
pub struct CancelJob {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Job ID
    pub job_id: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CancelJob {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        job_action(
            ctx,
            &self.project_id,
            self.job_id,
            "cancel",
            self.include_fields.as_deref(),
        )
        .await
    }
}

/// Get a job log
#[gitlab_tool(
    name = "get_job_log",
    description = "Get the console log (trace) of a job as plain text",
    category = "jobs",
    operation = "read"
)]
pub struct GetJobLog {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Job ID
    pub job_id: i64,
}

#[async_trait]
impl ToolExecutor for GetJobLog {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let job_id = validation::positive_id("job_id", self.job_id)?;

        let endpoint = format!("{}/trace", job_endpoint(&project, job_id));
        let log = ctx.gitlab.get_text(&endpoint).await?;

        ToolOutput::json_value(json!({
            "log": log,
            "job_id": job_id,
            "project_id": project,
        }))
    }
}
