//! Request and response bodies of the `/mcp` endpoint

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Incoming query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpRequest {
    pub query: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

/// Outcome marker of a response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpResponse {
    pub status: ResponseStatus,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl McpResponse {
    pub const APOLOGY: &'static str =
        "Sorry, an error occurred while processing your request.";

    pub fn success(response: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            response: response.into(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            response: Self::APOLOGY.to_string(),
            error: Some(message.into()),
        }
    }
}
