//! Default field sets per resource type

use std::fmt;

const PROJECT_FIELDS: &[&str] = &["id", "name", "path", "description", "web_url", "visibility"];
const ISSUE_FIELDS: &[&str] = &["id", "iid", "title", "state", "author", "created_at", "web_url"];
const MERGE_REQUEST_FIELDS: &[&str] = &[
    "id",
    "iid",
    "title",
    "state",
    "source_branch",
    "target_branch",
    "author",
    "web_url",
];
const COMMIT_FIELDS: &[&str] = &["id", "short_id", "title", "author_name", "created_at", "web_url"];
const BRANCH_FIELDS: &[&str] = &["name", "commit", "protected", "web_url"];
const PIPELINE_FIELDS: &[&str] = &["id", "status", "ref", "created_at", "web_url"];
const JOB_FIELDS: &[&str] = &["id", "name", "status", "stage", "created_at", "web_url"];
const USER_FIELDS: &[&str] = &["id", "username", "name", "avatar_url"];
const GROUP_FIELDS: &[&str] = &["id", "name", "path", "description", "web_url"];
const LABEL_FIELDS: &[&str] = &["id", "name", "color", "description"];
const MILESTONE_FIELDS: &[&str] = &["id", "iid", "title", "state", "due_date", "web_url"];

/// GitLab entity kinds that have a default field set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Project,
    Issue,
    MergeRequest,
    Commit,
    Branch,
    Pipeline,
    Job,
    User,
    Group,
    Label,
    Milestone,
}

impl ResourceType {
    /// Every resource type
    pub const ALL: &'static [ResourceType] = &[
        ResourceType::Project,
        ResourceType::Issue,
        ResourceType::MergeRequest,
        ResourceType::Commit,
        ResourceType::Branch,
        ResourceType::Pipeline,
        ResourceType::Job,
        ResourceType::User,
        ResourceType::Group,
        ResourceType::Label,
        ResourceType::Milestone,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Project => "project",
            ResourceType::Issue => "issue",
            ResourceType::MergeRequest => "merge_request",
            ResourceType::Commit => "commit",
            ResourceType::Branch => "branch",
            ResourceType::Pipeline => "pipeline",
            ResourceType::Job => "job",
            ResourceType::User => "user",
            ResourceType::Group => "group",
            ResourceType::Label => "label",
            ResourceType::Milestone => "milestone",
        }
    }

    /// Fields returned when the caller does not pick any, in output order
    pub const fn default_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceType::Project => PROJECT_FIELDS,
            ResourceType::Issue => ISSUE_FIELDS,
            ResourceType::MergeRequest => MERGE_REQUEST_FIELDS,
            ResourceType::Commit => COMMIT_FIELDS,
            ResourceType::Branch => BRANCH_FIELDS,
            ResourceType::Pipeline => PIPELINE_FIELDS,
            ResourceType::Job => JOB_FIELDS,
            ResourceType::User => USER_FIELDS,
            ResourceType::Group => GROUP_FIELDS,
            ResourceType::Label => LABEL_FIELDS,
            ResourceType::Milestone => MILESTONE_FIELDS,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which fields of a response the caller wants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSelection {
    /// The resource type's default set
    #[default]
    Default,
    /// Everything GitLab returned
    All,
    /// Exactly these fields (replaces the default set)
    Only(Vec<String>),
}

impl FieldSelection {
    /// Resolve to the concrete key set to keep, or `None` for no filtering.
    ///
    /// Resources without a default set are returned whole unless the caller
    /// names fields explicitly.
    pub fn resolve(&self, resource: Option<ResourceType>) -> Option<Vec<&str>> {
        match (self, resource) {
            (FieldSelection::All, _) => None,
            (FieldSelection::Only(fields), _) => Some(fields.iter().map(String::as_str).collect()),
            (FieldSelection::Default, Some(resource)) => Some(resource.default_fields().to_vec()),
            (FieldSelection::Default, None) => None,
        }
    }
}
