//! Personal Access Token authentication

use crate::auth::provider::{AuthHeader, AuthProvider};
use crate::error::AuthError;
use crate::util::SecretString;
use async_trait::async_trait;

/// Personal Access Token authentication provider
#[derive(Debug, Clone)]
pub struct PatProvider {
    token: SecretString,
}

impl PatProvider {
    /// Create a new PAT provider
    pub fn new(token: impl Into<SecretString>) -> Result<Self, AuthError> {
        let token = token.into();

        if token.is_blank() {
            return Err(AuthError::InvalidToken);
        }

        // Older tokens have no glpat- prefix, so the format is not enforced
        Ok(Self { token })
    }

    /// Create from environment variable
    ///
    /// Checks GITLAB_TOKEN, GITLAB_PRIVATE_TOKEN, and GITLAB_ACCESS_TOKEN
    /// in order of precedence.
    pub fn from_env() -> Result<Self, AuthError> {
        for var in &[
            "GITLAB_TOKEN",
            "GITLAB_PRIVATE_TOKEN",
            "GITLAB_ACCESS_TOKEN",
        ] {
            if let Ok(token) = std::env::var(var)
                && !token.trim().is_empty()
            {
                return Self::new(token);
            }
        }

        Err(AuthError::NotConfigured)
    }
}

#[async_trait]
impl AuthProvider for PatProvider {
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError> {
        Ok(AuthHeader::PrivateToken(self.token.clone()))
    }

    fn secret(&self) -> &SecretString {
        &self.token
    }

    fn auth_type(&self) -> &'static str {
        "Personal Access Token"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pat_provider_new() {
        let provider = PatProvider::new("glpat-xxxx").unwrap();
        assert_eq!(provider.secret().expose_secret(), "glpat-xxxx");
    }

    #[test]
    fn test_pat_provider_empty_token() {
        let result = PatProvider::new("");
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken));

        let result = PatProvider::new("   ");
        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_pat_provider_auth_header() {
        let provider = PatProvider::new("test-token").unwrap();
        let header = provider.get_auth_header().await.unwrap();

        assert!(matches!(header, AuthHeader::PrivateToken(_)));
        assert_eq!(header.header_name(), "PRIVATE-TOKEN");
        assert_eq!(header.header_value(), "test-token");
    }

    #[test]
    fn test_pat_provider_debug_redacted() {
        let provider = PatProvider::new("glpat-secret-value").unwrap();
        let debug_output = format!("{:?}", provider);
        assert!(!debug_output.contains("glpat-secret-value"));
    }
}
