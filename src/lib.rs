//! # toolhub
//!
//! A registry of utility tools served to AI clients over the Model Context
//! Protocol, plus a small HTTP demo endpoint.
//!
//! ## Crates
//!
//! - **[core]**: [`ToolRegistry`], input schemas, [`ToolResult`] and the handler traits
//! - **[tools]**: the standard tools and their external collaborators
//! - **[mcp]**: [`McpServer`], the stdio MCP front end
//! - **[http]**: the `/health` and `/mcp` demo routes
//!
//! ## Quick Start
//!
//! ```rust
//! use toolhub::{ContentBlock, InputSchema, ParamType, ToolRegistry, handler_fn};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register(
//!         "greet",
//!         "Say hello",
//!         InputSchema::empty().required("name", ParamType::String, "Who to greet"),
//!         Arc::new(handler_fn(|args| async move {
//!             let name = args.require_str("name")?;
//!             Ok(vec![ContentBlock::text(format!("Hello, {name}"))])
//!         })),
//!     )
//!     .unwrap();
//!
//! let result = registry
//!     .invoke("greet", serde_json::json!({"name": "Ada"}))
//!     .await
//!     .unwrap();
//! assert_eq!(result.text(), "Hello, Ada");
//! # });
//! ```

pub use toolhub_core as core;
pub use toolhub_http as http;
pub use toolhub_mcp as mcp;
pub use toolhub_tools as tools;

pub use toolhub_core::{
    ContentBlock, HandlerError, InputSchema, ParamType, Tool, ToolDefinition, ToolError,
    ToolHandler, ToolRegistry, ToolResult, handler_fn,
};
pub use toolhub_mcp::McpServer;
pub use toolhub_tools::{RegistrationReport, ToolsConfig, standard_registry};
