//! GitLab MCP Server
//!
//! A Model Context Protocol server exposing the GitLab REST API as tools.

use clap::Parser;
use gitlab_mcp_server::{
    auth::create_auth_provider,
    config::{AppConfig, LogFormat, TransportMode, load_config},
    gitlab::GitLabClient,
    server::GitLabMcpHandler,
    transport::{HttpConfig, run_http, run_stdio},
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// GitLab MCP Server - validated, field-filtered GitLab tools over MCP
#[derive(Parser, Debug)]
#[command(name = "gitlab-mcp-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "GITLAB_MCP_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "GITLAB_MCP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, env = "GITLAB_MCP_LOG_JSON")]
    log_json: bool,

    /// Transport mode (stdio, http)
    #[arg(long, env = "GITLAB_MCP_TRANSPORT")]
    transport: Option<String>,

    /// HTTP server host (for http transport)
    #[arg(long, env = "GITLAB_MCP_HTTP_HOST")]
    http_host: Option<String>,

    /// HTTP server port (for http transport)
    #[arg(long, env = "GITLAB_MCP_HTTP_PORT")]
    http_port: Option<u16>,

    /// Skip the GitLab connectivity check at startup
    #[arg(long, env = "GITLAB_MCP_SKIP_STARTUP_CHECK")]
    skip_startup_check: bool,
}

/// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing(args: &Args, config: &AppConfig) {
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json = args.log_json || config.logging.format == LogFormat::Json;
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_tracing(&args, &config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        gitlab_url = %config.gitlab.url,
        "Starting GitLab MCP server"
    );

    let auth = create_auth_provider(&config.gitlab)
        .inspect_err(|e| error!(error = %e, "Failed to create auth provider"))?;

    let gitlab = Arc::new(
        GitLabClient::new(&config.gitlab, auth)
            .inspect_err(|e| error!(error = %e, "Failed to create GitLab client"))?,
    );

    if args.skip_startup_check || !config.gitlab.startup_check {
        warn!("Skipping GitLab connectivity check");
    } else {
        gitlab
            .verify_connection()
            .await
            .inspect_err(|e| error!(error = %e, "GitLab connectivity check failed"))?;
    }

    let handler = GitLabMcpHandler::new_with_shared(&config, gitlab);

    let transport = match args.transport.as_deref() {
        Some(value) => TransportMode::parse(value)
            .ok_or_else(|| anyhow::anyhow!("Unknown transport '{}' (use stdio or http)", value))?,
        None => config.server.transport,
    };

    match transport {
        TransportMode::Stdio => run_stdio(handler).await?,
        TransportMode::Http => {
            let host = args.http_host.as_deref().unwrap_or(&config.server.host);
            let port = args.http_port.unwrap_or(config.server.port);
            run_http(handler, HttpConfig::from_host_port(host, port)?).await?;
        }
    }

    Ok(())
}
