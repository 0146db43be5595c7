//! Streamable HTTP transport
//!
//! Runs the MCP server over HTTP, with every session served at `/mcp`.

use crate::server::GitLabMcpHandler;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Default port for HTTP transport
pub const DEFAULT_HTTP_PORT: u16 = 20289;

/// Path the MCP service is mounted at
pub const MCP_PATH: &str = "/mcp";

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address to bind to (e.g., "127.0.0.1:20289")
    pub bind: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], DEFAULT_HTTP_PORT)),
        }
    }
}

impl HttpConfig {
    /// Create config from host and port strings
    pub fn from_host_port(host: &str, port: u16) -> Result<Self, std::net::AddrParseError> {
        let bind: SocketAddr = format!("{}:{}", host, port).parse()?;
        Ok(Self { bind })
    }
}

/// Build the router serving MCP sessions.
///
/// Each session gets a clone of `handler`; clones share the registry and
/// the GitLab client.
pub fn router(handler: GitLabMcpHandler) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .nest_service(MCP_PATH, service)
        .layer(TraceLayer::new_for_http())
}

/// Run the MCP server using streamable HTTP until Ctrl+C
pub async fn run_http(handler: GitLabMcpHandler, config: HttpConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    let local_addr = listener.local_addr()?;

    info!(
        "GitLab MCP server listening on http://{}{}",
        local_addr, MCP_PATH
    );

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received shutdown signal");
            }
        })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_from_host_port() {
        let config = HttpConfig::from_host_port("0.0.0.0", 8080).unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert!(config.bind.ip().is_unspecified());

        assert!(HttpConfig::from_host_port("not a host", 8080).is_err());
    }

    #[test]
    fn test_http_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.bind.port(), DEFAULT_HTTP_PORT);
        assert!(config.bind.ip().is_loopback());
    }
}
