//! Route handlers

use axum::{body::Bytes, http::StatusCode, response::Json};
use serde_json::{Value, json};
use tracing::info;

use crate::error::HttpError;
use crate::query::DemoQuery;
use crate::types::{McpRequest, McpResponse};

/// GET /health
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// POST /mcp
///
/// The body is parsed by hand so that a malformed request yields the error
/// envelope instead of the extractor's plain-text rejection.
pub async fn handle_query(body: Bytes) -> Result<Json<McpResponse>, HttpError> {
    let request: McpRequest = serde_json::from_slice(&body)
        .map_err(|e| HttpError::MalformedRequest(e.to_string()))?;

    info!(
        query = %request.query,
        request_id = request.request_id.as_deref().unwrap_or("-"),
        conversation_id = request.conversation_id.as_deref().unwrap_or("-"),
        "Received query"
    );

    let response = DemoQuery::from_request(&request).respond();
    Ok(Json(McpResponse::success(response)))
}
