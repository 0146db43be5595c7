//! Tool classification
//!
//! Every tool belongs to one category (the GitLab area it touches) and has
//! one operation type, which drives the MCP tool annotations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tool category, one per GitLab resource area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Projects,
    Issues,
    MergeRequests,
    Branches,
    Files,
    Commits,
    Tags,
    Pipelines,
    Jobs,
    Groups,
    Users,
    Labels,
    Milestones,
}

impl ToolCategory {
    /// Get the category name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::Projects => "projects",
            ToolCategory::Issues => "issues",
            ToolCategory::MergeRequests => "merge_requests",
            ToolCategory::Branches => "branches",
            ToolCategory::Files => "files",
            ToolCategory::Commits => "commits",
            ToolCategory::Tags => "tags",
            ToolCategory::Pipelines => "pipelines",
            ToolCategory::Jobs => "jobs",
            ToolCategory::Groups => "groups",
            ToolCategory::Users => "users",
            ToolCategory::Labels => "labels",
            ToolCategory::Milestones => "milestones",
        }
    }

    /// Get all categories
    pub const fn all() -> &'static [ToolCategory] {
        &[
            ToolCategory::Projects,
            ToolCategory::Issues,
            ToolCategory::MergeRequests,
            ToolCategory::Branches,
            ToolCategory::Files,
            ToolCategory::Commits,
            ToolCategory::Tags,
            ToolCategory::Pipelines,
            ToolCategory::Jobs,
            ToolCategory::Groups,
            ToolCategory::Users,
            ToolCategory::Labels,
            ToolCategory::Milestones,
        ]
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation type of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Read operations (get, list, search)
    Read,
    /// Write operations (create, update, comment)
    Write,
    /// Delete operations
    Delete,
    /// Execute operations (merge, approve, retry, cancel, close)
    Execute,
}

impl OperationType {
    /// Check if this operation is read-only
    pub const fn is_read_only(&self) -> bool {
        matches!(self, OperationType::Read)
    }

    /// Check if this operation may destroy or irreversibly change data
    pub const fn is_destructive(&self) -> bool {
        matches!(self, OperationType::Delete | OperationType::Execute)
    }

    /// Get the operation name as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationType::Read => "read",
            OperationType::Write => "write",
            OperationType::Delete => "delete",
            OperationType::Execute => "execute",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_matches_as_str() {
        for category in ToolCategory::all() {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, category.as_str());
        }
    }

    #[test]
    fn test_operation_type_flags() {
        assert!(OperationType::Read.is_read_only());
        assert!(!OperationType::Write.is_read_only());
        assert!(!OperationType::Read.is_destructive());
        assert!(!OperationType::Write.is_destructive());
        assert!(OperationType::Delete.is_destructive());
        assert!(OperationType::Execute.is_destructive());
    }
}
