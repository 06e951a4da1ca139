//! MCP Server implementation that exposes a toolhub registry

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use std::sync::Arc;
use toolhub_core::ToolRegistry;
use tracing::{debug, info};

use crate::adapter::{arguments_value, to_call_tool_result, to_mcp_tool};
use crate::error::{McpError, McpResult};

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub instructions: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "toolhub".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: "toolhub exposes everyday utility tools: news search, IT hot \
                           entries, desktop cleanup, Docker pruning, Notion pages and \
                           webpage text. Call tools/list for the tools enabled on this host."
                .to_string(),
        }
    }
}

/// MCP Server serving the tools of a [`ToolRegistry`]
#[derive(Debug, Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    server_info: ServerInfo,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            server_info: ServerInfo::default(),
        }
    }

    /// Create a new MCP server with custom server info
    pub fn with_info(registry: Arc<ToolRegistry>, server_info: ServerInfo) -> Self {
        Self {
            registry,
            server_info,
        }
    }

    /// Get server information
    pub fn info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Get the tool registry
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Tool listings in registration order
    pub fn tool_list(&self) -> Vec<Tool> {
        self.registry
            .definitions()
            .into_iter()
            .map(to_mcp_tool)
            .collect()
    }

    /// Call a tool by name.
    ///
    /// Unknown tools and invalid arguments are errors; a failing handler is an
    /// `Ok` result with `is_error` set.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> McpResult<CallToolResult> {
        debug!(tool = %name, "Calling tool");

        let result = self
            .registry
            .invoke(name, arguments_value(arguments))
            .await?;

        debug!(tool = %name, is_error = result.is_error(), "Tool execution completed");
        Ok(to_call_tool_result(result))
    }

    /// Serve via stdio (stdin/stdout) - standard MCP transport
    ///
    /// Returns once the client disconnects. Nothing else may write to stdout
    /// while this runs.
    pub async fn serve_stdio(self) -> McpResult<()> {
        info!(
            server = %self.server_info.name,
            version = %self.server_info.version,
            tools = self.registry.len(),
            "Starting MCP server on stdio"
        );

        let service = self
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| McpError::TransportError(format!("failed to start: {e}")))?;

        let reason = service
            .waiting()
            .await
            .map_err(|e| McpError::TransportError(format!("service task failed: {e}")))?;

        info!(reason = ?reason, "MCP server stopped");
        Ok(())
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.server_info.name.clone(),
                version: self.server_info.version.clone(),
                ..Default::default()
            },
            instructions: Some(self.server_info.instructions.clone()),
        }
    }

    async fn list_tools(
        &self,
        _pagination: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tool_list(),
            meta: Default::default(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.invoke(&request.name, request.arguments)
            .await
            .map_err(ErrorData::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;
    use serde_json::json;
    use toolhub_core::{InputSchema, ParamType};
    use toolhub_testing::MockTool;

    fn server_with(tools: Vec<MockTool>) -> McpServer {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register_tool(tool).unwrap();
        }
        McpServer::new(Arc::new(registry))
    }

    fn first_text(result: &CallToolResult) -> &str {
        result
            .content
            .first()
            .and_then(|c| match &c.raw {
                RawContent::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .expect("CallToolResult should contain text content")
    }

    fn args(value: serde_json::Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[test]
    fn test_server_info() {
        let server = server_with(vec![]);
        let info = server.get_info();

        assert_eq!(info.server_info.name, "toolhub");
        assert_eq!(info.protocol_version, ProtocolVersion::V_2024_11_05);
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_tool_list_keeps_order_and_schema() {
        let server = server_with(vec![
            MockTool::new("fetch_news").with_schema(InputSchema::empty().required(
                "query",
                ParamType::String,
                "Keywords",
            )),
            MockTool::new("docker_prune"),
        ]);

        let tools = server.tool_list();

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "fetch_news");
        assert_eq!(tools[0].input_schema["required"], json!(["query"]));
        assert_eq!(tools[1].name, "docker_prune");
    }

    #[tokio::test]
    async fn test_call_tool() {
        let echo = MockTool::new("echo").with_response("hello");
        let server = server_with(vec![echo.clone()]);

        let result = server
            .invoke("echo", args(json!({"message": "hi"})))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(false));
        assert_eq!(first_text(&result), "hello");
        assert_eq!(echo.call_history(), vec![json!({"message": "hi"})]);
    }

    #[tokio::test]
    async fn test_handler_failure_is_error_result() {
        let server = server_with(vec![MockTool::new("flaky").with_failure("upstream 503")]);

        let result = server.invoke("flaky", None).await.unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("upstream 503"));
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let spy = MockTool::new("spy");
        let server = server_with(vec![spy.clone()]);

        let result = server.invoke("unknown_tool", None).await;

        assert!(matches!(result, Err(McpError::ToolNotFound(_))));
        assert_eq!(spy.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let spy = MockTool::new("fetch_news").with_schema(InputSchema::empty().required(
            "query",
            ParamType::String,
            "Keywords",
        ));
        let server = server_with(vec![spy.clone()]);

        let result = server.invoke("fetch_news", args(json!({"query": 7}))).await;

        match result {
            Err(McpError::InvalidParameters(message)) => assert!(message.contains("query")),
            other => panic!("expected InvalidParameters, got {other:?}"),
        }
        assert_eq!(spy.call_count(), 0);
    }
}
