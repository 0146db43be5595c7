//! GitLab API response types
//!
//! Tool results stay as raw JSON; only the startup check decodes typed bodies.

use serde::Deserialize;

/// Response of `GET /version`
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub revision: Option<String>,
}

/// Response of `GET /user` (the token's owner)
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Outcome of a successful startup check
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub version: Option<String>,
    pub username: String,
    pub can_list_projects: bool,
}
