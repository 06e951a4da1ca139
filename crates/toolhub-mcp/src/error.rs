//! MCP error types
//!
//! Failures of the MCP front end, and their mapping onto protocol-level
//! `rmcp::ErrorData`. Tool handler failures never appear here: those travel
//! as `CallToolResult`s with `is_error` set.

use rmcp::ErrorData;
use rmcp::model::Content;
use thiserror::Error;
use toolhub_core::ToolError;

/// MCP operation result type
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur during MCP operations
#[derive(Debug, Error)]
pub enum McpError {
    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Invalid tool parameters
    #[error("Invalid tool parameters: {0}")]
    InvalidParameters(String),

    /// Tool registration failed
    #[error("Tool registration failed: {0}")]
    Registration(String),

    /// Transport error
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl McpError {
    /// Protocol error sent back to the client
    pub fn to_error_data(&self) -> ErrorData {
        match self {
            McpError::ToolNotFound(_) | McpError::InvalidParameters(_) => {
                ErrorData::invalid_params(self.to_string(), None)
            }
            McpError::Registration(_) | McpError::TransportError(_) => {
                ErrorData::internal_error(self.to_string(), None)
            }
        }
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool { name } => McpError::ToolNotFound(name),
            err @ ToolError::InvalidArgument { .. } => McpError::InvalidParameters(err.to_string()),
            err @ (ToolError::DuplicateTool { .. } | ToolError::InvalidToolName { .. }) => {
                McpError::Registration(err.to_string())
            }
        }
    }
}

impl From<McpError> for ErrorData {
    fn from(err: McpError) -> Self {
        err.to_error_data()
    }
}

/// Implement IntoContents for McpError so it can be returned from tool functions
impl rmcp::model::IntoContents for McpError {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::text(self.to_string())]
    }
}
