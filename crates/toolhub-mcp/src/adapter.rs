//! Conversions between toolhub types and MCP wire types

use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::Value;
use std::sync::Arc;
use toolhub_core::{ToolDefinition, ToolResult};

/// Convert a registered definition to an MCP tool listing
pub fn to_mcp_tool(definition: &ToolDefinition) -> Tool {
    let description = if definition.description.is_empty() {
        format!("toolhub tool: {}", definition.name)
    } else {
        definition.description.clone()
    };

    let input_schema: JsonObject = match definition.input_schema.to_json_schema() {
        Value::Object(schema) => schema,
        _ => JsonObject::new(),
    };

    Tool::new(
        definition.name.to_string(),
        description,
        Arc::new(input_schema),
    )
}

/// Convert an invocation result to an MCP call result, carrying `is_error` across
pub fn to_call_tool_result(result: ToolResult) -> CallToolResult {
    let is_error = result.is_error();
    let content: Vec<Content> = result
        .content
        .iter()
        .filter_map(|block| block.as_text().map(Content::text))
        .collect();

    if is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

/// Raw arguments as the registry expects them; absent arguments become `null`
pub fn arguments_value(arguments: Option<JsonObject>) -> Value {
    arguments.map_or(Value::Null, Value::Object)
}
