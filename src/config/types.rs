//! Configuration types for gitlab-mcp-server
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables. The loaded value is immutable
//! and shared by reference for the lifetime of the process.

use crate::util::SecretString;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// GitLab connection settings
    pub gitlab: GitLabConfig,

    /// Server/transport settings
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// GitLab connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// GitLab instance URL (e.g., `https://gitlab.com`)
    pub url: String,

    /// Personal Access Token (prefer env var GITLAB_TOKEN)
    pub token: Option<SecretString>,

    /// API version (default: "v4")
    pub api_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,

    /// Probe version, user and project access before serving
    pub startup_check: bool,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            url: "https://gitlab.com".to_string(),
            token: None,
            api_version: "v4".to_string(),
            timeout_secs: 30,
            verify_ssl: true,
            startup_check: true,
        }
    }
}

impl GitLabConfig {
    /// Get the full API base URL
    pub fn api_url(&self) -> String {
        format!(
            "{}/api/{}",
            self.url.trim_end_matches('/'),
            self.api_version
        )
    }
}

/// Server/transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Transport mode
    pub transport: TransportMode,

    /// HTTP host (for http transport)
    pub host: String,

    /// HTTP port (for http transport)
    pub port: u16,

    /// Server name for MCP
    pub name: String,

    /// Server version for MCP
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            host: "127.0.0.1".to_string(),
            port: 20289,
            name: "gitlab-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Transport mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Standard input/output (default)
    #[default]
    Stdio,
    /// Streamable HTTP
    Http,
}

impl TransportMode {
    /// Parse a CLI value, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdio" => Some(TransportMode::Stdio),
            "http" | "streamable-http" => Some(TransportMode::Http),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gitlab_config_api_url() {
        let config = GitLabConfig {
            url: "https://gitlab.example.com".to_string(),
            api_version: "v4".to_string(),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "https://gitlab.example.com/api/v4");

        // Test with trailing slash
        let config = GitLabConfig {
            url: "https://gitlab.example.com/".to_string(),
            api_version: "v4".to_string(),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "https://gitlab.example.com/api/v4");
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.gitlab.url, "https://gitlab.com");
        assert_eq!(config.gitlab.timeout_secs, 30);
        assert!(config.gitlab.verify_ssl);
        assert!(config.gitlab.startup_check);
        assert!(config.gitlab.token.is_none());
        assert_eq!(config.server.transport, TransportMode::Stdio);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_transport_mode_parse() {
        assert_eq!(TransportMode::parse("stdio"), Some(TransportMode::Stdio));
        assert_eq!(TransportMode::parse("HTTP"), Some(TransportMode::Http));
        assert_eq!(
            TransportMode::parse("streamable-http"),
            Some(TransportMode::Http)
        );
        assert_eq!(TransportMode::parse("sse"), None);
    }

    #[test]
    fn test_deserialize_log_format() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
