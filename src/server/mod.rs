//! MCP server implementation
//!
//! Contains the MCP protocol handler that bridges MCP to the tool registry.

mod handler;

pub use handler::GitLabMcpHandler;
