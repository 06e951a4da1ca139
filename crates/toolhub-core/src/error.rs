//! Registry errors.
//!
//! These are the failures the registry itself reports: registration problems
//! and invocations rejected before a handler runs. Handler failures are not
//! here; they are folded into an error [`crate::ToolResult`].

use crate::identifiers::NameValidationError;

/// Errors raised by [`crate::ToolRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    /// A tool with this name is already registered
    #[error("Tool '{name}' is already registered")]
    DuplicateTool { name: String },

    /// The tool name failed validation at registration
    #[error("Invalid tool name '{name}': {source}")]
    InvalidToolName {
        name: String,
        #[source]
        source: NameValidationError,
    },

    /// No tool with this name is registered
    #[error("Tool '{name}' not found in registry")]
    UnknownTool { name: String },

    /// Arguments did not match the tool's input schema
    #[error("Tool '{tool}' received invalid argument '{field}': {reason}")]
    InvalidArgument {
        tool: String,
        field: String,
        reason: String,
    },
}

impl ToolError {
    /// The tool name this error refers to
    pub fn tool_name(&self) -> &str {
        match self {
            ToolError::DuplicateTool { name }
            | ToolError::InvalidToolName { name, .. }
            | ToolError::UnknownTool { name } => name,
            ToolError::InvalidArgument { tool, .. } => tool,
        }
    }

    /// Registration-time errors abort startup
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            ToolError::DuplicateTool { .. } | ToolError::InvalidToolName { .. }
        )
    }
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_tool() {
        let err = ToolError::UnknownTool {
            name: "fetch_news".to_string(),
        };
        assert_eq!(err.to_string(), "Tool 'fetch_news' not found in registry");
        assert_eq!(err.tool_name(), "fetch_news");
        assert!(!err.is_registration_error());

        let err = ToolError::InvalidArgument {
            tool: "fetch_news".to_string(),
            field: "query".to_string(),
            reason: "missing required field".to_string(),
        };
        assert!(err.to_string().contains("'query'"));
    }

    #[test]
    fn registration_errors() {
        let dup = ToolError::DuplicateTool {
            name: "docker_prune".to_string(),
        };
        assert!(dup.is_registration_error());

        let invalid = ToolError::InvalidToolName {
            name: "bad name".to_string(),
            source: NameValidationError::ContainsWhitespace,
        };
        assert!(invalid.is_registration_error());
        assert!(invalid.to_string().contains("whitespace"));
    }
}
