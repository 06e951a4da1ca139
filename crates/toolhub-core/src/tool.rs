//! Tool contract: definitions, handlers and the uniform result shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::identifiers::ToolName;
use crate::schema::{Arguments, InputSchema};

/// A typed unit of tool output.
///
/// Only text is produced today; the tag leaves room for further kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// Text payload, if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
        }
    }
}

/// Outcome of one invocation.
///
/// Handler failures are reported here too: the content then holds a single
/// human-readable error message and `is_error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(message)],
            is_error: true,
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// All text blocks joined with newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Registered description of a tool. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: ToolName,
    pub description: String,
    pub input_schema: InputSchema,
}

/// Failure raised by a handler.
///
/// The registry downgrades these to error [`ToolResult`]s; they never
/// escape an invocation.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// An external API, browser or subprocess call failed
    #[error("{service} call failed: {message}")]
    ExternalCall { service: String, message: String },

    /// A subprocess ran but reported failure
    #[error("command '{command}' failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// The collaborator answered with something unusable
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A field the schema declared was absent
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// A field was present but its value is unusable
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The invocation exceeded the registry's call timeout
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl HandlerError {
    pub fn external(service: impl Into<String>, message: impl std::fmt::Display) -> Self {
        HandlerError::ExternalCall {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

pub type HandlerResult = Result<Vec<ContentBlock>, HandlerError>;

/// The function implementing a tool's behavior.
///
/// The returned future is the whole of the tool's work: every sub-operation
/// must complete before it resolves.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Arguments) -> HandlerResult;
}

/// A self-describing handler, registered with [`crate::ToolRegistry::register_tool`].
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use toolhub_core::{Arguments, ContentBlock, HandlerResult, InputSchema, ParamType, Tool, ToolHandler};
///
/// struct Shout;
///
/// #[async_trait]
/// impl ToolHandler for Shout {
///     async fn call(&self, args: Arguments) -> HandlerResult {
///         let text = args.require_str("text")?;
///         Ok(vec![ContentBlock::text(text.to_uppercase())])
///     }
/// }
///
/// impl Tool for Shout {
///     fn name(&self) -> &str { "shout" }
///     fn description(&self) -> &str { "Uppercase the input" }
///     fn input_schema(&self) -> InputSchema {
///         InputSchema::empty().required("text", ParamType::String, "Text to shout")
///     }
/// }
/// ```
pub trait Tool: ToolHandler {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::empty()
    }
}

/// Adapter turning an async closure into a [`ToolHandler`]
pub struct FnHandler<F>(F);

/// Wrap an async closure as a handler.
///
/// ```rust
/// use toolhub_core::{handler_fn, ContentBlock};
///
/// let handler = handler_fn(|_args| async { Ok(vec![ContentBlock::text("pong")]) });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn call(&self, args: Arguments) -> HandlerResult {
        (self.0)(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_block_serializes_with_type_tag() {
        let block = ContentBlock::text("hello");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value, serde_json::json!({"type": "text", "text": "hello"}));
    }

    #[test]
    fn result_text_joins_blocks() {
        let result = ToolResult::success(vec![
            ContentBlock::text("line 1"),
            ContentBlock::text("line 2"),
        ]);
        assert!(!result.is_error());
        assert_eq!(result.text(), "line 1\nline 2");
    }

    #[test]
    fn error_result_has_single_block() {
        let result = ToolResult::error("boom");
        assert!(result.is_error());
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.text(), "boom");
    }

    #[test]
    fn handler_error_messages() {
        let err = HandlerError::external("newsapi", "status 401");
        assert_eq!(err.to_string(), "newsapi call failed: status 401");

        let err = HandlerError::InvalidArgument {
            field: "page_id".to_string(),
            reason: "not a page id".to_string(),
        };
        assert_eq!(err.to_string(), "invalid argument 'page_id': not a page id");

        let err = HandlerError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "timed out after 1500ms");
    }

    #[tokio::test]
    async fn fn_handler_runs_closure() {
        let handler = handler_fn(|args: Arguments| async move {
            let name = args.get_str("name").unwrap_or("world").to_string();
            Ok(vec![ContentBlock::text(format!("hello {name}"))])
        });

        let blocks = handler.call(Arguments::default()).await.unwrap();
        assert_eq!(blocks, vec![ContentBlock::text("hello world")]);
    }
}
