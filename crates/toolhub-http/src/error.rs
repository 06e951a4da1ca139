//! HTTP error handling
//!
//! Every failure on `/mcp` is reported as a 500 error envelope with the
//! diagnostic in `error` and a generic apology in `response`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::net::SocketAddr;

use crate::config::ConfigError;
use crate::types::McpResponse;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(McpResponse::error(self.to_string())),
        )
            .into_response()
    }
}
