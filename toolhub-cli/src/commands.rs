//! Subcommand implementations

use serde_json::json;
use std::sync::Arc;
use toolhub_core::ToolRegistry;
use toolhub_http::HttpConfigBuilder;
use toolhub_mcp::McpServer;
use toolhub_tools::{ToolsConfig, ToolsError, standard_registry};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Tools(#[from] ToolsError),

    #[error(transparent)]
    ToolsConfig(#[from] toolhub_tools::ConfigError),

    #[error(transparent)]
    HttpConfig(#[from] toolhub_http::ConfigError),

    #[error(transparent)]
    Mcp(#[from] toolhub_mcp::McpError),

    #[error(transparent)]
    Http(#[from] toolhub_http::HttpError),

    #[error("Failed to render tool list: {0}")]
    Json(#[from] serde_json::Error),
}

fn load_registry() -> Result<ToolRegistry, CliError> {
    let config = ToolsConfig::from_env()?;
    let (registry, report) = standard_registry(&config)?;

    for (tool, reason) in &report.skipped {
        info!(tool = %tool, reason = %reason, "Skipped tool");
    }
    info!(tools = ?report.registered, "Tool registry ready");
    Ok(registry)
}

/// Serve the standard tools over MCP stdio
pub async fn run_stdio() -> Result<(), CliError> {
    let registry = load_registry()?;
    McpServer::new(Arc::new(registry)).serve_stdio().await?;
    Ok(())
}

/// Serve the HTTP demo endpoint; flags take precedence over the environment
pub async fn run_http(port: Option<u16>, host: Option<String>) -> Result<(), CliError> {
    let mut builder = HttpConfigBuilder::from_env()?;
    if let Some(port) = port {
        builder = builder.port(port);
    }
    if let Some(host) = host {
        builder = builder.host(host);
    }
    toolhub_http::serve(builder.build()?).await?;
    Ok(())
}

/// Print the enabled tools and their input schemas as JSON
pub fn list_tools() -> Result<(), CliError> {
    let registry = load_registry()?;
    let tools: Vec<_> = registry
        .definitions()
        .into_iter()
        .map(|def| {
            json!({
                "name": def.name.as_str(),
                "description": def.description,
                "input_schema": def.input_schema.to_json_schema(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}
