//! # Mock Tools for Testing
//!
//! A mock tool returns canned content and records every call, so tests can
//! assert both on what the registry returned and on whether the handler ran.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use toolhub_core::{
    Arguments, ContentBlock, HandlerError, HandlerResult, InputSchema, Tool, ToolHandler,
};

#[derive(Debug, Clone)]
enum Response {
    Text(String),
    Failure(String),
}

/// A tool with a fixed response and call tracking
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    description: String,
    schema: InputSchema,
    response: Response,
    call_count: Arc<Mutex<usize>>,
    call_history: Arc<Mutex<Vec<Value>>>,
}

impl MockTool {
    /// Create a new mock tool that answers `Mock response from {name}`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            response: Response::Text(format!("Mock response from {name}")),
            description: format!("Mock tool {name}"),
            name,
            schema: InputSchema::empty(),
            call_count: Arc::new(Mutex::new(0)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_schema(mut self, schema: InputSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Answer every call with `text`
    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.response = Response::Text(text.into());
        self
    }

    /// Fail every call with an external-call error carrying `message`
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.response = Response::Failure(message.into());
        self
    }

    /// Get the number of times this tool has been called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Arguments of every call, in order
    pub fn call_history(&self) -> Vec<Value> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Reset call count and history
    pub fn reset(&self) {
        *self.call_count.lock().unwrap() = 0;
        self.call_history.lock().unwrap().clear();
    }
}

#[async_trait]
impl ToolHandler for MockTool {
    async fn call(&self, args: Arguments) -> HandlerResult {
        *self.call_count.lock().unwrap() += 1;
        self.call_history
            .lock()
            .unwrap()
            .push(Value::Object(args.into_inner()));

        match &self.response {
            Response::Text(text) => Ok(vec![ContentBlock::text(text.clone())]),
            Response::Failure(message) => Err(HandlerError::external(&self.name, message)),
        }
    }
}

impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> InputSchema {
        self.schema.clone()
    }
}
