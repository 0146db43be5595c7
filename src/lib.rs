//! GitLab MCP Server
//!
//! A Model Context Protocol server that exposes the GitLab REST API (v4) as a set of tools.
//!
//! Every tool call follows the same pipeline:
//!
//! ```text
//! arguments → validation → GitLab HTTP call → response shaping → result
//!                  │                 │
//!                  └──── error translation ────→ typed error payload
//! ```
//!
//! ## Features
//!
//! - **63 GitLab tools** covering projects, issues, merge requests, pipelines, jobs,
//!   files, groups, users, labels and milestones
//! - **Fail-fast validation** of identifiers, pagination bounds, git references and field lists
//! - **Field filtering** with per-resource default field sets and `include_fields` overrides
//! - **Pagination metadata** (`has_next`, `next_page`, `total`) derived from GitLab's headers
//! - **Typed error translation** that never leaks the access token
//! - **Multiple transports** - stdio and streamable HTTP
//!
//! ## Example Configuration
//!
//! ```toml
//! [gitlab]
//! url = "https://gitlab.example.com"
//! # token from GITLAB_TOKEN env var
//! verify_ssl = true
//!
//! [server]
//! transport = "stdio"
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod gitlab;
pub mod response;
pub mod server;
pub mod tools;
pub mod transport;
pub mod util;
pub mod validation;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use server::GitLabMcpHandler;
