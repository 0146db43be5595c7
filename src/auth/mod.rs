//! Authentication module
//!
//! Provides authentication for GitLab API access via Personal Access Tokens
//! sent in the `PRIVATE-TOKEN` header.

pub mod provider;
pub mod token;

pub use provider::{AuthHeader, AuthProvider, BoxedAuthProvider};
pub use token::PatProvider;

use crate::config::GitLabConfig;
use crate::error::AuthError;

/// Create an auth provider from configuration
pub fn create_auth_provider(config: &GitLabConfig) -> Result<BoxedAuthProvider, AuthError> {
    match &config.token {
        Some(token) => Ok(Box::new(PatProvider::new(token.clone())?)),
        None => Ok(Box::new(PatProvider::from_env()?)),
    }
}
