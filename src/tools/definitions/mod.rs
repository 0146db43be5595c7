//! Tool definitions
//!
//! This module contains all GitLab MCP tool implementations. Every tool
//! validates its arguments first, so a rejected call never reaches GitLab.

pub mod branches;
pub mod commits;
pub mod files;
pub mod groups;
pub mod issues;
pub mod jobs;
pub mod labels;
pub mod merge_requests;
pub mod milestones;
pub mod pipelines;
pub mod projects;
pub mod tags;
pub mod users;

use crate::error::ValidationError;
use crate::tools::ToolRegistry;
use crate::validation::{self, IdInput, PathOrId};
use serde::Serialize;
use serde_json::Value;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut ToolRegistry) {
    registry.register_all_auto();
}

/// Validate a `project_id` argument
pub(crate) fn project_id(input: &IdInput) -> Result<PathOrId, ValidationError> {
    validation::namespace_id("project_id", input)
}

/// Validate a `group_id` argument
pub(crate) fn group_id(input: &IdInput) -> Result<PathOrId, ValidationError> {
    validation::namespace_id("group_id", input)
}

/// Set `key` on a JSON object body when `value` is present
pub(crate) fn insert_some<T: Serialize>(body: &mut Value, key: &str, value: Option<T>) {
    if let (Some(value), Value::Object(map)) = (value, body)
        && let Ok(value) = serde_json::to_value(value)
    {
        map.insert(key.to_string(), value);
    }
}
