//! Label tools
//!
//! Tools for managing project labels.

use crate::error::ToolError;
use crate::response::ResourceType;
use crate::tools::definitions::{insert_some, project_id};
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, IntInput};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

/// List project labels
#[gitlab_tool(
    name = "list_labels",
    description = "List labels in a project",
    category = "labels",
    operation = "read"
)]
pub struct ListLabels {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Search for labels matching this string
    #[serde(default)]
    pub search: Option<String>,
    /// Page number (default: 1)
    #[serde(default)]
    pub page: Option<IntInput>,
    /// Number of labels per page (1-100, default: 20)
    #[serde(default)]
    pub per_page: Option<IntInput>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for ListLabels {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let pagination = validation::pagination(self.page.as_ref(), self.per_page.as_ref())?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new()
            .page(pagination)
            .optional_text("search", self.search.as_deref())
            .build();

        let endpoint = format!("/projects/{}/labels{}", project, query);
        ctx.list(&endpoint, Some(ResourceType::Label), &fields, pagination)
            .await
    }
}

/// Create a new label
#[gitlab_tool(
    name = "create_label",
    description = "Create a new label in a project",
    category = "labels",
    operation = "write"
)]
pub struct CreateLabel {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Label name
    pub name: String,
    /// Label color (hex code with #, e.g., "#FF0000")
    pub color: String,
    /// Label description
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateLabel {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let name = validation::non_empty("name", &self.name)?;
        let color = validation::non_empty("color", &self.color)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({
            "name": name,
            "color": color,
        });
        insert_some(
            &mut body,
            "description",
            self.description.as_deref().filter(|d| !d.is_empty()),
        );

        let endpoint = format!("/projects/{}/labels", project);
        let result: Value = ctx.gitlab.post(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::Label), result, &fields)
    }
}

/// Update a label
#[gitlab_tool(
    name = "update_label",
    description = "Update a label's name, color or description",
    category = "labels",
    operation = "write"
)]
pub struct UpdateLabel {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Label ID
    pub label_id: i64,
    /// Current label name
    #[serde(default)]
    pub name: Option<String>,
    /// New label name
    #[serde(default)]
    pub new_name: Option<String>,
    /// New color (hex code with #)
    #[serde(default)]
    pub color: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// Comma-separated fields to include, or "all"
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for UpdateLabel {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let label_id = validation::positive_id("label_id", self.label_id)?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let mut body = json!({});
        for (key, value) in [
            ("name", &self.name),
            ("new_name", &self.new_name),
            ("color", &self.color),
        ] {
            let value = value
                .as_deref()
                .map(|v| validation::non_empty(key, v))
                .transpose()?;
            insert_some(&mut body, key, value);
        }
        insert_some(&mut body, "description", self.description.as_deref());

        let endpoint = format!("/projects/{}/labels/{}", project, label_id);
        let result: Value = ctx.gitlab.put(&endpoint, &body).await?;
        ToolOutput::shaped(Some(ResourceType::Label), result, &fields)
    }
}

/// Delete a label
#[gitlab_tool(
    name = "delete_label",
    description = "Delete a label from a project",
    category = "labels",
    operation = "delete"
)]
pub struct DeleteLabel {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Label ID
    pub label_id: i64,
}

#[async_trait]
impl ToolExecutor for DeleteLabel {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let label_id = validation::positive_id("label_id", self.label_id)?;

        let endpoint = format!("/projects/{}/labels/{}", project, label_id);
        ctx.gitlab.delete(&endpoint).await?;

        ToolOutput::success(format!(
            "Label {} deleted successfully from project {}",
            label_id,
            project.label()
        ))
    }
}
