//! HTTP router configuration

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::HttpConfig;
use crate::handlers::{handle_query, health_check};

/// Create the Axum router with all endpoints and middleware
pub fn router(config: &HttpConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/mcp", post(handle_query))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}
