//! # Toolhub HTTP
//!
//! A small HTTP demo endpoint that sits next to the MCP stdio server.
//!
//! - `GET /health` returns `{"status": "healthy"}`
//! - `POST /mcp` takes `{query, conversation_id, request_id, parameters}` and
//!   answers `getCurrentTime`, `getWeather` and `calculateSum`; any other query
//!   is echoed back as unrecognized
//!
//! Malformed bodies get a 500 error envelope. See [`HttpConfig`] for the
//! environment variables.

pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod router;
pub mod server;
pub mod types;

pub use config::{ConfigError, HttpConfig, HttpConfigBuilder};
pub use error::HttpError;
pub use query::{DemoQuery, SumParams, WeatherParams};
pub use router::router;
pub use server::{serve, shutdown_signal};
pub use types::{McpRequest, McpResponse, ResponseStatus};
