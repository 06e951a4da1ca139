//! # Toolhub Tools
//!
//! The standard tool set served by toolhub. Each tool reaches one external
//! collaborator through a narrow trait, so tests can swap in fakes:
//!
//! | tool | collaborator | production implementation |
//! |------|--------------|---------------------------|
//! | `fetch_news` | [`NewsSource`] | [`NewsApiClient`] |
//! | `get_it_hotentry` | [`BrowserLauncher`] | [`HttpBrowserLauncher`] |
//! | `clean_desktop_files` | [`Trash`] | [`SystemTrash`] |
//! | `docker_prune` | [`CommandRunner`] | [`ProcessRunner`] |
//! | `fetch_notion_page` | [`PageContentSource`] | [`NotionClient`] |
//! | `fetch_webpage` | [`PageFetcher`] | [`HttpPageFetcher`] |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use toolhub_core::ToolRegistry;
//! use toolhub_tools::{ToolsConfig, register_standard_tools};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ToolsConfig::from_env()?;
//! let mut registry = ToolRegistry::new();
//! let report = register_standard_tools(&mut registry, &config)?;
//! for (name, reason) in &report.skipped {
//!     eprintln!("{name} disabled: {reason}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod desktop;
pub mod docker;
pub mod hotentry;
pub mod news;
pub mod notion;
pub mod webpage;

pub use browser::{
    BrowserLauncher, BrowserSession, HttpBrowserLauncher, Link, LinkSelector, with_session,
};
pub use config::{ConfigError, ToolsConfig, ToolsConfigBuilder};
pub use desktop::{CleanDesktopTool, SystemTrash, Trash};
pub use docker::{CommandOutput, CommandRunner, DockerPruneTool, ProcessRunner};
pub use hotentry::HotEntryTool;
pub use news::{Article, FetchNewsTool, NewsApiClient, NewsSource};
pub use notion::{Block, BlockPage, FetchNotionPageTool, NotionClient, PageContentSource};
pub use webpage::{FetchWebpageTool, HttpPageFetcher, PageFetcher};

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use toolhub_core::{ToolError, ToolRegistry};
use tracing::{info, warn};

const USER_AGENT: &str = concat!("toolhub/", env!("CARGO_PKG_VERSION"));

/// Errors raised while assembling the standard tool set
#[derive(Debug, thiserror::Error)]
pub enum ToolsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Registry(#[from] ToolError),
}

/// Which tools were registered and which were left out, with the reason
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    pub registered: Vec<String>,
    pub skipped: Vec<(String, String)>,
}

impl RegistrationReport {
    fn skip(&mut self, name: &str, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(tool = name, reason = %reason, "Tool not registered");
        self.skipped.push((name.to_string(), reason));
    }
}

/// Shared outbound HTTP client
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Build a registry holding the standard tools, honoring the configured call timeout
pub fn standard_registry(
    config: &ToolsConfig,
) -> Result<(ToolRegistry, RegistrationReport), ToolsError> {
    let mut registry = match config.call_timeout() {
        Some(timeout) => ToolRegistry::new().with_call_timeout(timeout),
        None => ToolRegistry::new(),
    };
    let report = register_standard_tools(&mut registry, config)?;
    Ok((registry, report))
}

/// Register every standard tool whose prerequisites are configured.
///
/// Tools needing a missing credential are skipped and listed in the report.
///
/// # Errors
///
/// Fails if the HTTP client cannot be built or a tool name is already taken.
pub fn register_standard_tools(
    registry: &mut ToolRegistry,
    config: &ToolsConfig,
) -> Result<RegistrationReport, ToolsError> {
    let client = http_client(config.http_timeout())?;
    let mut report = RegistrationReport::default();

    match &config.news_api_key {
        Some(key) => {
            let source = NewsApiClient::new(client.clone(), &config.news_api_url, key);
            registry.register_tool(FetchNewsTool::new(Arc::new(source)))?;
            report.registered.push("fetch_news".to_string());
        }
        None => report.skip("fetch_news", "NEWS_API_KEY is not set"),
    }

    let launcher = HttpBrowserLauncher::new(client.clone(), config.max_page_bytes);
    registry.register_tool(HotEntryTool::new(Arc::new(launcher), &config.hotentry_url))?;
    report.registered.push("get_it_hotentry".to_string());

    match config.resolve_desktop_dir() {
        Some(dir) => {
            registry.register_tool(CleanDesktopTool::new(dir, Arc::new(SystemTrash)))?;
            report.registered.push("clean_desktop_files".to_string());
        }
        None => report.skip("clean_desktop_files", "no desktop directory could be determined"),
    }

    registry.register_tool(DockerPruneTool::new(Arc::new(ProcessRunner)))?;
    report.registered.push("docker_prune".to_string());

    match &config.notion_api_key {
        Some(key) => {
            let source = NotionClient::new(
                client.clone(),
                &config.notion_api_url,
                key,
                &config.notion_version,
            );
            registry.register_tool(FetchNotionPageTool::new(Arc::new(source)))?;
            report.registered.push("fetch_notion_page".to_string());
        }
        None => report.skip("fetch_notion_page", "NOTION_API_KEY is not set"),
    }

    let fetcher = HttpPageFetcher::new(client, config.max_page_bytes);
    registry.register_tool(FetchWebpageTool::new(Arc::new(fetcher)))?;
    report.registered.push("fetch_webpage".to_string());

    info!(
        registered = report.registered.len(),
        skipped = report.skipped.len(),
        "Standard tools registered"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn credentials_gate_registration() {
        let config = ToolsConfigBuilder::new()
            .desktop_dir(PathBuf::from("/tmp"))
            .build()
            .unwrap();
        let mut registry = ToolRegistry::new();

        let report = register_standard_tools(&mut registry, &config).unwrap();

        assert_eq!(
            report.registered,
            vec![
                "get_it_hotentry",
                "clean_desktop_files",
                "docker_prune",
                "fetch_webpage"
            ]
        );
        let skipped: Vec<&str> = report.skipped.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(skipped, vec!["fetch_news", "fetch_notion_page"]);
        assert_eq!(registry.tool_names(), report.registered);
    }

    #[test]
    fn all_six_with_credentials() {
        let config = ToolsConfigBuilder::new()
            .news_api_key("n")
            .notion_api_key("k")
            .desktop_dir(PathBuf::from("/tmp"))
            .call_timeout_secs(10)
            .build()
            .unwrap();

        let (registry, report) = standard_registry(&config).unwrap();

        assert!(report.skipped.is_empty());
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.call_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(
            registry.tool_names(),
            vec![
                "fetch_news",
                "get_it_hotentry",
                "clean_desktop_files",
                "docker_prune",
                "fetch_notion_page",
                "fetch_webpage"
            ]
        );
    }

    #[test]
    fn registering_twice_fails() {
        let config = ToolsConfigBuilder::new()
            .desktop_dir(PathBuf::from("/tmp"))
            .build()
            .unwrap();
        let mut registry = ToolRegistry::new();
        register_standard_tools(&mut registry, &config).unwrap();

        let err = register_standard_tools(&mut registry, &config).unwrap_err();
        assert!(matches!(
            err,
            ToolsError::Registry(ToolError::DuplicateTool { .. })
        ));
    }
}
