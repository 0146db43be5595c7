//! GitLab API module
//!
//! Provides the HTTP client used by every tool and the startup connectivity check.

pub mod client;
pub mod types;

pub use client::GitLabClient;
pub use types::*;
