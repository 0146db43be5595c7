//! Repository file tools
//!
//! Read, create, update and delete single files through the repository
//! files API. File paths are URL-encoded as one path segment.

use crate::error::ToolError;
use crate::tools::definitions::project_id;
use crate::tools::executor::{ToolContext, ToolExecutor, ToolOutput};
use crate::util::QueryBuilder;
use crate::validation::{self, IdInput, PathOrId};
use async_trait::async_trait;
use serde_json::{Value, json};

use gitlab_mcp_macros::gitlab_tool;

const DEFAULT_REF: &str = "main";

fn file_endpoint(project: &PathOrId, encoded_path: &str) -> String {
    format!("/projects/{}/repository/files/{}", project, encoded_path)
}

/// Validated arguments shared by create and update
struct FileCommit {
    encoded_path: String,
    body: Value,
}

fn file_commit(
    file_path: &str,
    branch: &str,
    content: &str,
    commit_message: &str,
    encoding: Option<&str>,
) -> Result<FileCommit, ToolError> {
    let encoded_path = validation::file_path("file_path", file_path)?;
    let branch = validation::reference("branch", branch)?;
    let commit_message = validation::non_empty("commit_message", commit_message)?;
    let encoding = validation::file_content(encoding, content)?.unwrap_or_else(|| "text".into());

    Ok(FileCommit {
        encoded_path,
        body: json!({
            "branch": branch,
            "content": content,
            "commit_message": commit_message,
            "encoding": encoding,
        }),
    })
}

/// Get a file
#[gitlab_tool(
    name = "get_file",
    description = "Get a file from a repository, including its base64-encoded content",
    category = "files",
    operation = "read"
)]
pub struct GetFile {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Path of the file in the repository (e.g. "src/main.rs")
    pub file_path: String,
    /// Branch, tag or commit SHA (default: main)
    #[serde(default, rename = "ref")]
    pub ref_name: Option<String>,
    /// Comma-separated fields to include, or "all" (default: all)
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for GetFile {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let encoded_path = validation::file_path("file_path", &self.file_path)?;
        let ref_name = validation::reference("ref", self.ref_name.as_deref().unwrap_or(DEFAULT_REF))?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let query = QueryBuilder::new().param("ref", ref_name).build();
        let endpoint = format!("{}{}", file_endpoint(&project, &encoded_path), query);
        ctx.fetch(&endpoint, None, &fields).await
    }
}

/// Create a file
#[gitlab_tool(
    name = "create_file",
    description = "Create a new file in a repository with a commit",
    category = "files",
    operation = "write"
)]
pub struct CreateFile {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Path of the new file
    pub file_path: String,
    /// Branch to commit to
    pub branch: String,
    /// File content
    pub content: String,
    /// Commit message
    pub commit_message: String,
    /// Content encoding: text or base64 (default: text)
    #[serde(default)]
    pub encoding: Option<String>,
    /// Comma-separated fields to include, or "all" (default: all)
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for CreateFile {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let commit = file_commit(
            &self.file_path,
            &self.branch,
            &self.content,
            &self.commit_message,
            self.encoding.as_deref(),
        )?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let endpoint = file_endpoint(&project, &commit.encoded_path);
        let result: Value = ctx.gitlab.post(&endpoint, &commit.body).await?;
        ToolOutput::shaped(None, result, &fields)
    }
}

/// Update a file
#[gitlab_tool(
    name = "update_file",
    description = "Replace the content of an existing file with a commit",
    category = "files",
    operation = "write"
)]
pub struct UpdateFile {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Path of the file to update
    pub file_path: String,
    /// Branch to commit to
    pub branch: String,
    /// New file content
    pub content: String,
    /// Commit message
    pub commit_message: String,
    /// Content encoding: text or base64 (default: text)
    #[serde(default)]
    pub encoding: Option<String>,
    /// Comma-separated fields to include, or "all" (default: all)
    #[serde(default)]
    pub include_fields: Option<String>,
}

#[async_trait]
impl ToolExecutor for UpdateFile {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let commit = file_commit(
            &self.file_path,
            &self.branch,
            &self.content,
            &self.commit_message,
            self.encoding.as_deref(),
        )?;
        let fields = validation::include_fields(self.include_fields.as_deref())?;

        let endpoint = file_endpoint(&project, &commit.encoded_path);
        let result: Value = ctx.gitlab.put(&endpoint, &commit.body).await?;
        ToolOutput::shaped(None, result, &fields)
    }
}

/// Delete a file
#[gitlab_tool(
    name = "delete_file",
    description = "Delete a file from a repository with a commit",
    category = "files",
    operation = "delete"
)]
pub struct DeleteFile {
    /// Project ID or URL-encoded path
    pub project_id: IdInput,
    /// Path of the file to delete
    pub file_path: String,
    /// Branch to commit to
    pub branch: String,
    /// Commit message
    pub commit_message: String,
}

#[async_trait]
impl ToolExecutor for DeleteFile {
    async fn execute(&self, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let project = project_id(&self.project_id)?;
        let encoded_path = validation::file_path("file_path", &self.file_path)?;
        let branch = validation::reference("branch", &self.branch)?;
        let commit_message = validation::non_empty("commit_message", &self.commit_message)?;

        let body = json!({
            "branch": branch,
            "commit_message": commit_message,
        });
        ctx.gitlab
            .delete_with_body(&file_endpoint(&project, &encoded_path), &body)
            .await?;

        ToolOutput::success(format!(
            "File '{}' deleted successfully from branch '{}'",
            self.file_path.trim().trim_start_matches('/'),
            branch
        ))
    }
}
