//! Pipeline tools
//!
//! Tools for listing, triggering, retrying and canceling CI/CD pipelines.

use crate::error::{ToolError, ValidationError};
use crate::response::ResourceType;
use crate::tools::definitions::project_id;
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput, PIPELINE_STATUSES, PathOrId};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use gitlab_mcp_macros::gitlab_tool;

fn pipeline_endpoint(project: &PathOrId, pipeline_id: u64) -> String {
    format!("/projects/{}/pipelines/{}", project, pipeline_id)
}

/// POST a pipeline action (`retry`, `cancel`) and shape the returned pipeline
async fn pipeline_action(
    ctx: &ToolContext,
    project: &IdInput,
    pipeline_id: i64,
    action: &str,
    include_fields: Option<&str>,
) -> Result<ToolOutput, ToolError> {
    let project = project_id(project)?;
    let pipeline_id = validation::positive_id("pipeline_id", pipeline_id)?;
    let fields = validation::include_fields(include_fields)?;

    let endpoint = format!("{}/{}", pipeline_endpoint(&project, pipeline_id), action);
    let result: Value = ctx.gitlab.post_empty(&endpoint).await?;
    ToolOutput::shaped(Some(ResourceType::Pipeline), result, &fields)
}

/// List pipelines
#[gitlab_tool(
    name = "list_pipelines",
    description = "List CI/CD pipelines in a project, optionally filtered by ref and status",
    category = "pipelines",
    operation = "read"
)]
pub struct ListPipelines {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Filter by branch or tag name
    #[serde(default, rename = "ref")]
    pub ref_name: Option<String>,
    /// Filter by status: running, pending, success, failed, canceled, skipped, created, manual
    #[serde(default)]
    pub status: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of pipelines per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListPipelines {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let ref_name = validation::optional_reference("ref", self.ref_name.as_deref())?;
        let status = validation::one_of("status", self.status.as_deref(), PIPELINE_STATUSES)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional("ref", ref_name)
            .optional("status", status)
            .build();

        let endpoint = format!("/projects/{}/pipelines{}", project, query);
        ctx.list(&endpoint, Some(ResourceType::Pipeline), &fields, pagination)
            .await
    }
}

/// Get a pipeline
#[gitlab_tool(
    name = "get_pipeline",
    description = "Get details of a specific pipeline",
    category = "pipelines",
    operation = "read"
)]
pub struct GetPipeline {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Pipeline ID
    pub pipeline_id: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetPipeline {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pipeline_id = validation::positive_id("pipeline_id", self.pipeline_id)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        ctx.fetch(
            &pipeline_endpoint(&project, pipeline_id),
            Some(ResourceType::Pipeline),
            &fields,
        )
        .await
    }
}

/// Trigger a pipeline
#[gitlab_tool(
    name = "create_pipeline",
    description = "Run a new pipeline for a branch, tag or commit, with optional variables",
    category = "pipelines",
    operation = "execute"
)]
pub struct CreatePipeline {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Branch, tag or commit SHA to run the pipeline on
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Pipeline variables as key-value pairs
    #[serde(default)]
    pub variables: Option<BTreeMap<String, String>>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreatePipeline {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let ref_name = validation::reference("ref", &self.ref_name)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({ "ref": ref_name });
        if let Some(variables) = self.variables.as_ref().filter(|v| !v.is_empty()) {
            body["variables"] = pipeline_variables(variables)?;
        }

        let endpoint = format!("/projects/{}/pipeline", project);
        let result: Value = ctx.gitlab.post(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::Pipeline), result, &fields)
    }
}

/// Convert a variable map into GitLab's `[{key, value}]` form
fn pipeline_variables(variables: &BTreeMap<String, String>) -> Result<Value, ValidationError> {
    let mut list = Vec::with_capacity(variables.len());
    for (key, value) in variables {
        if key.trim().is_empty() {
            return Err(ValidationError::argument(
                "variables",
                "variable names must not be empty",
            ));
        }
        list.push(json!({ "key": key, "value": value }));
    }
    Ok(Value::Array(list))
}

/// Retry a pipeline
#[gitlab_tool(
    name = "retry_pipeline",
    description = "Retry the failed jobs of a pipeline",
    category = "pipelines",
    operation = "execute"
)]
pub struct RetryPipeline {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Pipeline ID
    pub pipeline_id: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for RetryPipeline {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        pipeline_action(
            ctx,
            &self.project_id,
            self.pipeline_id,
            "retry",
            self.include_fields.as_deref(),
        )
        .await
    }
}

/// Cancel a pipeline
#[gitlab_tool(
    name = "cancel_pipeline",
    description = "Cancel the running jobs of a pipeline",
    category = "pipelines",
    operation = "execute"
)]
pub struct CancelPipeline {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Pipeline ID
    pub pipeline_id: i64,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CancelPipeline {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        pipeline_action(
            ctx,
            &self.project_id,
            self.pipeline_id,
            "cancel",
            self.include_fields.as_deref(),
        )
        .await
    }
}
