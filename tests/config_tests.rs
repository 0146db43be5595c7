//! Configuration loading tests

use gitlab_mcp_server::config::{LogFormat, TransportMode, load_config, load_config_from_str};
use gitlab_mcp_server::error::ConfigError;
use std::env;
use std::fs;
use tempfile::tempdir;

const MINIMAL_CONFIG: &str = r#"
[server]
name = "test-server"
version = "1.0.0"
transport = "stdio"

[gitlab]
url = "https://gitlab.example.com"
token = "test-token"
"#;

const FULL_CONFIG: &str = r#"
[server]
name = "gitlab-mcp-test"
version = "0.1.0"
transport = "http"
host = "0.0.0.0"
port = 9000

[gitlab]
url = "https://gitlab.company.com"
token = "glpat-test"
timeout_secs = 60
verify_ssl = false
startup_check = false

[logging]
level = "debug"
format = "json"
"#;

/// Variables read by the loader, cleared before each env test
const ENV_VARS: &[&str] = &[
    "GITLAB_TOKEN",
    "GITLAB_PRIVATE_TOKEN",
    "GITLAB_ACCESS_TOKEN",
    "GITLAB_URL",
    "GITLAB_VERIFY_SSL",
    "GITLAB_MCP_GITLAB__TOKEN",
    "GITLAB_MCP_GITLAB__URL",
    "GITLAB_MCP_SERVER__PORT",
];

fn clear_env() {
    for var in ENV_VARS {
        unsafe {
            env::remove_var(var);
        }
    }
}

fn token(config: &gitlab_mcp_server::AppConfig) -> Option<&str> {
    config.gitlab.token.as_ref().map(|t| t.expose_secret())
}

#[test]
fn test_minimal_config() {
    let config = load_config_from_str(MINIMAL_CONFIG).unwrap();

    assert_eq!(config.server.name, "test-server");
    assert_eq!(config.server.version, "1.0.0");
    assert_eq!(config.server.transport, TransportMode::Stdio);

    assert_eq!(config.gitlab.url, "https://gitlab.example.com");
    assert_eq!(token(&config), Some("test-token"));
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    // Server
    assert_eq!(config.server.name, "gitlab-mcp-test");
    assert_eq!(config.server.transport, TransportMode::Http);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);

    // GitLab
    assert_eq!(config.gitlab.url, "https://gitlab.company.com");
    assert_eq!(config.gitlab.timeout_secs, 60);
    assert!(!config.gitlab.verify_ssl);
    assert!(!config.gitlab.startup_check);
    assert_eq!(
        config.gitlab.api_url(),
        "https://gitlab.company.com/api/v4"
    );

    // Logging
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_config_defaults() {
    let config = load_config_from_str(
        r#"
[gitlab]
token = "t"
"#,
    )
    .unwrap();

    assert_eq!(config.gitlab.url, "https://gitlab.com");
    assert_eq!(config.gitlab.timeout_secs, 30);
    assert!(config.gitlab.verify_ssl);
    assert_eq!(config.server.transport, TransportMode::Stdio);
    assert_eq!(config.server.port, 20289);
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_invalid_url_scheme() {
    let err = load_config_from_str(
        r#"
[gitlab]
url = "gitlab.example.com"
"#,
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn test_token_not_printed_in_debug() {
    let config = load_config_from_str(MINIMAL_CONFIG).unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("test-token"));
}

#[test]
#[serial_test::serial]
fn test_missing_token_is_error() {
    clear_env();

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[gitlab]\nurl = \"https://gitlab.com\"\n").unwrap();

    let err = load_config(Some(config_path.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ConfigError::Missing { .. }));
}

#[test]
#[serial_test::serial]
fn test_missing_config_file_is_error() {
    clear_env();

    let err = load_config(Some("/definitely/not/here.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
#[serial_test::serial]
fn test_gitlab_token_env_overrides_file() {
    clear_env();

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[gitlab]\nurl = \"https://gitlab.com\"\ntoken = \"file-token\"\n",
    )
    .unwrap();

    unsafe {
        env::set_var("GITLAB_TOKEN", "env-token");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(token(&config), Some("env-token"));

    clear_env();
}

#[test]
#[serial_test::serial]
fn test_token_env_fallback_order() {
    clear_env();

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[gitlab]\nurl = \"https://gitlab.com\"\n").unwrap();

    unsafe {
        env::set_var("GITLAB_TOKEN", "  ");
        env::set_var("GITLAB_PRIVATE_TOKEN", "private-token");
        env::set_var("GITLAB_ACCESS_TOKEN", "access-token");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(token(&config), Some("private-token"));

    clear_env();
}

#[test]
#[serial_test::serial]
fn test_gitlab_url_and_verify_ssl_env() {
    clear_env();

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[gitlab]\nurl = \"https://gitlab.com\"\ntoken = \"t\"\n",
    )
    .unwrap();

    unsafe {
        env::set_var("GITLAB_URL", "https://gitlab.internal");
        env::set_var("GITLAB_VERIFY_SSL", "false");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.gitlab.url, "https://gitlab.internal");
    assert!(!config.gitlab.verify_ssl);

    clear_env();
}

#[test]
#[serial_test::serial]
fn test_prefixed_env_overrides_file() {
    clear_env();

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[gitlab]\ntoken = \"t\"\n\n[server]\nport = 9000\n",
    )
    .unwrap();

    unsafe {
        env::set_var("GITLAB_MCP_SERVER__PORT", "9100");
        env::set_var("GITLAB_MCP_GITLAB__URL", "https://prefixed.example.com");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.gitlab.url, "https://prefixed.example.com");

    clear_env();
}

#[test]
#[serial_test::serial]
fn test_gitlab_url_env_beats_prefixed_env() {
    clear_env();

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[gitlab]\ntoken = \"t\"\n").unwrap();

    unsafe {
        env::set_var("GITLAB_MCP_GITLAB__URL", "https://prefixed.example.com");
        env::set_var("GITLAB_URL", "https://plain.example.com");
    }

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(config.gitlab.url, "https://plain.example.com");

    clear_env();
}
