//! # Toolhub MCP
//!
//! Serves a [`toolhub_core::ToolRegistry`] over the Model Context Protocol
//! using the official Rust SDK (`rmcp`).
//!
//! - `tools/list` returns every registered tool with its JSON Schema
//! - `tools/call` validates and dispatches through the registry
//! - handler failures come back as `CallToolResult` with `is_error: true`
//! - unknown tools and invalid arguments are `invalid_params` protocol errors
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolhub_core::ToolRegistry;
//! use toolhub_mcp::McpServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ToolRegistry::new();
//!     McpServer::new(Arc::new(registry)).serve_stdio().await?;
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod error;
pub mod server;

pub use adapter::{arguments_value, to_call_tool_result, to_mcp_tool};
pub use error::{McpError, McpResult};
pub use server::{McpServer, ServerInfo};
