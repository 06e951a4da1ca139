//! # Toolhub Core
//!
//! The tool contract and the registry/invoker shared by every toolhub front end.
//! A tool is a named, schema-described async handler; the [`ToolRegistry`]
//! validates invocations against the schema, dispatches them and normalizes
//! the outcome into a [`ToolResult`].

pub mod error;
pub mod identifiers;
pub mod registry;
pub mod schema;
pub mod tool;

pub use error::{RegistryResult, ToolError};
pub use identifiers::{MAX_NAME_LENGTH, NameValidationError, ToolName};
pub use registry::ToolRegistry;
pub use schema::{Arguments, InputSchema, ParamSpec, ParamType, SchemaViolation};
pub use tool::{
    ContentBlock, FnHandler, HandlerError, HandlerResult, Tool, ToolDefinition, ToolHandler,
    ToolResult, handler_fn,
};
