use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{RegistryResult, ToolError};
use crate::identifiers::ToolName;
use crate::schema::InputSchema;
use crate::tool::{HandlerError, Tool, ToolDefinition, ToolHandler, ToolResult};

struct RegisteredTool {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

/// Registry of named tools and the invoker that runs them.
///
/// Tools are kept in registration order for discovery and looked up by name
/// in O(1). Every invocation is validated against the tool's schema before
/// its handler runs; handler failures come back as error [`ToolResult`]s
/// rather than as `Err`.
///
/// # Example
///
/// ```rust
/// use toolhub_core::{handler_fn, ContentBlock, InputSchema, ToolRegistry};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let mut registry = ToolRegistry::new();
/// registry
///     .register(
///         "ping",
///         "Reply with pong",
///         InputSchema::empty(),
///         Arc::new(handler_fn(|_| async { Ok(vec![ContentBlock::text("pong")]) })),
///     )
///     .expect("unique name");
///
/// let result = registry.invoke("ping", serde_json::json!({})).await.unwrap();
/// assert_eq!(result.text(), "pong");
/// # });
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<RegisteredTool>>,
    index: HashMap<ToolName, usize>,
    call_timeout: Option<Duration>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry with no call timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every handler call by `timeout`. Expiry yields an error result.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }

    /// Add a tool.
    ///
    /// # Errors
    ///
    /// `DuplicateTool` if the name is taken, `InvalidToolName` if it fails validation.
    pub fn register(
        &mut self,
        name: &str,
        description: impl Into<String>,
        input_schema: InputSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> RegistryResult<()> {
        let tool_name = ToolName::parse(name).map_err(|source| ToolError::InvalidToolName {
            name: name.to_string(),
            source,
        })?;

        if self.index.contains_key(&tool_name) {
            return Err(ToolError::DuplicateTool {
                name: name.to_string(),
            });
        }

        let definition = ToolDefinition {
            name: tool_name.clone(),
            description: description.into(),
            input_schema,
        };

        debug!(tool = %tool_name, "Registered tool");
        self.index.insert(tool_name, self.tools.len());
        self.tools.push(Arc::new(RegisteredTool {
            definition,
            handler,
        }));
        Ok(())
    }

    /// Add a self-describing tool
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) -> RegistryResult<()> {
        let name = tool.name().to_string();
        let description = tool.description().to_string();
        let schema = tool.input_schema();
        self.register(&name, description, schema, Arc::new(tool))
    }

    /// Builder-style [`Self::register_tool`]
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> RegistryResult<Self> {
        self.register_tool(tool)?;
        Ok(self)
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|t| &t.definition).collect()
    }

    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.lookup(name).map(|t| &t.definition)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|t| t.definition.name.to_string())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn lookup(&self, name: &str) -> Option<&Arc<RegisteredTool>> {
        let tool_name = ToolName::parse(name).ok()?;
        self.index.get(&tool_name).map(|&i| &self.tools[i])
    }

    /// Run a tool.
    ///
    /// # Errors
    ///
    /// `UnknownTool` or `InvalidArgument`, both raised before the handler is
    /// called. Once the handler runs the call always yields `Ok`.
    pub async fn invoke(&self, name: &str, arguments: Value) -> RegistryResult<ToolResult> {
        let tool = self.lookup(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;

        let args = tool
            .definition
            .input_schema
            .validate(arguments)
            .map_err(|violation| ToolError::InvalidArgument {
                tool: name.to_string(),
                field: violation.field,
                reason: violation.reason,
            })?;

        debug!(tool = %name, "Invoking tool");

        let outcome = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, tool.handler.call(args))
                .await
                .unwrap_or(Err(HandlerError::Timeout(limit))),
            None => tool.handler.call(args).await,
        };

        match outcome {
            Ok(content) => {
                info!(tool = %name, blocks = content.len(), "Tool completed");
                Ok(ToolResult::success(content))
            }
            Err(err) => {
                error!(tool = %name, error = %err, "Tool handler failed");
                Ok(ToolResult::error(format!("Tool '{name}' failed: {err}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Arguments, ParamType};
    use crate::tool::{ContentBlock, HandlerResult, handler_fn};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct UppercaseTool;

    #[async_trait]
    impl ToolHandler for UppercaseTool {
        async fn call(&self, args: Arguments) -> HandlerResult {
            Ok(vec![ContentBlock::text(
                args.require_str("text")?.to_uppercase(),
            )])
        }
    }

    impl Tool for UppercaseTool {
        fn name(&self) -> &str {
            "uppercase"
        }

        fn description(&self) -> &str {
            "Uppercase text"
        }

        fn input_schema(&self) -> InputSchema {
            InputSchema::empty().required("text", ParamType::String, "Text to transform")
        }
    }

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ToolHandler for CountingHandler {
        async fn call(&self, _args: Arguments) -> HandlerResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ContentBlock::text("counted")])
        }
    }

    #[tokio::test]
    async fn dispatches_to_registered_tool() {
        let registry = ToolRegistry::new().with_tool(UppercaseTool).unwrap();

        let result = registry
            .invoke("uppercase", json!({"text": "toolhub"}))
            .await
            .unwrap();

        assert!(!result.is_error());
        assert_eq!(result.text(), "TOOLHUB");
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(UppercaseTool).unwrap();

        let err = registry.register_tool(UppercaseTool).unwrap_err();
        assert_eq!(
            err,
            ToolError::DuplicateTool {
                name: "uppercase".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn invalid_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        let err = registry
            .register(
                "not valid",
                "",
                InputSchema::empty(),
                Arc::new(handler_fn(|_| async { Ok(vec![]) })),
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidToolName { .. }));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_never_reaches_a_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "counter",
                "",
                InputSchema::empty(),
                Arc::new(CountingHandler {
                    calls: Arc::clone(&calls),
                }),
            )
            .unwrap();

        let err = registry.invoke("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool { .. }));

        let err = registry.invoke("bad name!", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool { .. }));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_a_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "counter",
                "",
                InputSchema::empty().required("query", ParamType::String, "q"),
                Arc::new(CountingHandler {
                    calls: Arc::clone(&calls),
                }),
            )
            .unwrap();

        let err = registry.invoke("counter", json!({})).await.unwrap_err();
        match err {
            ToolError::InvalidArgument { tool, field, .. } => {
                assert_eq!(tool, "counter");
                assert_eq!(field, "query");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn handler_failure_becomes_error_result() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "flaky",
                "",
                InputSchema::empty(),
                Arc::new(handler_fn(|_| async {
                    Err(HandlerError::external("newsapi", "connection refused"))
                })),
            )
            .unwrap();

        let result = registry.invoke("flaky", json!({})).await.unwrap();
        assert!(result.is_error());
        assert_eq!(result.content.len(), 1);
        assert!(result.text().contains("connection refused"));
        assert!(result.text().contains("flaky"));
    }

    #[tokio::test]
    async fn call_timeout_yields_error_result() {
        let mut registry = ToolRegistry::new().with_call_timeout(Duration::from_millis(20));
        registry
            .register(
                "slow",
                "",
                InputSchema::empty(),
                Arc::new(handler_fn(|_| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(vec![ContentBlock::text("too late")])
                })),
            )
            .unwrap();

        let result = registry.invoke("slow", json!({})).await.unwrap();
        assert!(result.is_error());
        assert!(result.text().contains("timed out"));
    }

    #[test]
    fn definitions_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(
                    name,
                    format!("{name} tool"),
                    InputSchema::empty(),
                    Arc::new(handler_fn(|_| async { Ok(vec![]) })),
                )
                .unwrap();
        }

        let names: Vec<_> = registry
            .definitions()
            .iter()
            .map(|d| d.name.to_string())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            registry.definition("alpha").map(|d| d.description.as_str()),
            Some("alpha tool")
        );
        assert!(registry.contains("mid"));
        assert!(!registry.contains("omega"));
    }
}
