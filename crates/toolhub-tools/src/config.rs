//! # Environment-Based Tool Configuration
//!
//! Credentials and endpoints for the standard tools, loaded from the
//! environment and handed to each tool at construction.
//!
//! ## Environment Variables
//!
//! ### Credentials
//! - `NEWS_API_KEY` - NewsAPI key; `fetch_news` is not registered without it
//! - `NOTION_API_KEY` - Notion integration token; `fetch_notion_page` is not registered without it
//!
//! ### Endpoints
//! - `TOOLHUB_NEWS_API_URL` - NewsAPI base URL (default: `https://newsapi.org`)
//! - `TOOLHUB_NOTION_API_URL` - Notion API base URL (default: `https://api.notion.com`)
//! - `TOOLHUB_NOTION_VERSION` - `Notion-Version` header (default: `2022-06-28`)
//! - `TOOLHUB_HOTENTRY_URL` - Hot-entry page (default: `https://b.hatena.ne.jp/hotentry/it`)
//! - `TOOLHUB_DESKTOP_DIR` - Folder emptied by `clean_desktop_files` (default: the user's desktop)
//!
//! ### Limits
//! - `TOOLHUB_HTTP_TIMEOUT_SECS` - Outbound HTTP request timeout (default: 30)
//! - `TOOLHUB_CALL_TIMEOUT_SECS` - Per-invocation timeout, unset for none
//! - `TOOLHUB_MAX_PAGE_BYTES` - Largest page `fetch_webpage` will render (default: 5242880 / 5MB)

use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org";
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_HOTENTRY_URL: &str = "https://b.hatena.ne.jp/hotentry/it";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Resolved configuration for the standard tools
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    pub news_api_key: Option<String>,
    pub notion_api_key: Option<String>,
    pub news_api_url: String,
    pub notion_api_url: String,
    pub notion_version: String,
    pub hotentry_url: String,
    pub desktop_dir: Option<PathBuf>,
    pub http_timeout_secs: u64,
    pub call_timeout_secs: Option<u64>,
    pub max_page_bytes: usize,
}

impl ToolsConfig {
    /// Load from the environment with validation
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        ToolsConfigBuilder::from_env()?.build()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }

    /// The folder `clean_desktop_files` operates on, if one can be determined
    pub fn resolve_desktop_dir(&self) -> Option<PathBuf> {
        self.desktop_dir
            .clone()
            .or_else(dirs::desktop_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let builder = ToolsConfigBuilder::default();
        Self {
            news_api_key: builder.news_api_key,
            notion_api_key: builder.notion_api_key,
            news_api_url: builder.news_api_url,
            notion_api_url: builder.notion_api_url,
            notion_version: builder.notion_version,
            hotentry_url: builder.hotentry_url,
            desktop_dir: builder.desktop_dir,
            http_timeout_secs: builder.http_timeout_secs,
            call_timeout_secs: builder.call_timeout_secs,
            max_page_bytes: builder.max_page_bytes,
        }
    }
}

/// Builder for `ToolsConfig` with environment variable support
#[derive(Debug, Clone)]
pub struct ToolsConfigBuilder {
    news_api_key: Option<String>,
    notion_api_key: Option<String>,
    news_api_url: String,
    notion_api_url: String,
    notion_version: String,
    hotentry_url: String,
    desktop_dir: Option<PathBuf>,
    http_timeout_secs: u64,
    call_timeout_secs: Option<u64>,
    max_page_bytes: usize,
}

impl Default for ToolsConfigBuilder {
    fn default() -> Self {
        Self {
            news_api_key: None,
            notion_api_key: None,
            news_api_url: DEFAULT_NEWS_API_URL.to_string(),
            notion_api_url: DEFAULT_NOTION_API_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            hotentry_url: DEFAULT_HOTENTRY_URL.to_string(),
            desktop_dir: None,
            http_timeout_secs: 30,
            call_timeout_secs: None,
            max_page_bytes: 5 * 1024 * 1024, // 5MB
        }
    }
}

impl ToolsConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        // Credentials
        if let Some(key) = get_env_secret("NEWS_API_KEY") {
            builder = builder.news_api_key(key);
        }
        if let Some(key) = get_env_secret("NOTION_API_KEY") {
            builder = builder.notion_api_key(key);
        }

        // Endpoints
        if let Some(url) = get_env_string("TOOLHUB_NEWS_API_URL") {
            builder = builder.news_api_url(url);
        }
        if let Some(url) = get_env_string("TOOLHUB_NOTION_API_URL") {
            builder = builder.notion_api_url(url);
        }
        if let Some(version) = get_env_string("TOOLHUB_NOTION_VERSION") {
            builder = builder.notion_version(version);
        }
        if let Some(url) = get_env_string("TOOLHUB_HOTENTRY_URL") {
            builder = builder.hotentry_url(url);
        }
        if let Some(dir) = get_env_string("TOOLHUB_DESKTOP_DIR") {
            builder = builder.desktop_dir(PathBuf::from(dir));
        }

        // Limits
        if let Some(timeout) = get_env_u64("TOOLHUB_HTTP_TIMEOUT_SECS")? {
            builder = builder.http_timeout_secs(timeout);
        }
        if let Some(timeout) = get_env_u64("TOOLHUB_CALL_TIMEOUT_SECS")? {
            builder = builder.call_timeout_secs(timeout);
        }
        if let Some(max) = get_env_usize("TOOLHUB_MAX_PAGE_BYTES")? {
            builder = builder.max_page_bytes(max);
        }

        Ok(builder)
    }

    #[must_use]
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn notion_api_key(mut self, key: impl Into<String>) -> Self {
        self.notion_api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn news_api_url(mut self, url: impl Into<String>) -> Self {
        self.news_api_url = url.into();
        self
    }

    #[must_use]
    pub fn notion_api_url(mut self, url: impl Into<String>) -> Self {
        self.notion_api_url = url.into();
        self
    }

    #[must_use]
    pub fn notion_version(mut self, version: impl Into<String>) -> Self {
        self.notion_version = version.into();
        self
    }

    #[must_use]
    pub fn hotentry_url(mut self, url: impl Into<String>) -> Self {
        self.hotentry_url = url.into();
        self
    }

    #[must_use]
    pub fn desktop_dir(mut self, dir: PathBuf) -> Self {
        self.desktop_dir = Some(dir);
        self
    }

    /// Set outbound HTTP request timeout in seconds
    #[must_use]
    pub fn http_timeout_secs(mut self, timeout: u64) -> Self {
        self.http_timeout_secs = timeout;
        self
    }

    /// Set the per-invocation timeout in seconds
    #[must_use]
    pub fn call_timeout_secs(mut self, timeout: u64) -> Self {
        self.call_timeout_secs = Some(timeout);
        self
    }

    /// Set the largest page body `fetch_webpage` accepts
    #[must_use]
    pub fn max_page_bytes(mut self, max: usize) -> Self {
        self.max_page_bytes = max;
        self
    }

    /// Validate configuration and build `ToolsConfig`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<ToolsConfig, ConfigError> {
        self.validate()?;

        Ok(ToolsConfig {
            news_api_key: self.news_api_key,
            notion_api_key: self.notion_api_key,
            news_api_url: trim_base_url(self.news_api_url),
            notion_api_url: trim_base_url(self.notion_api_url),
            notion_version: self.notion_version,
            hotentry_url: self.hotentry_url,
            desktop_dir: self.desktop_dir,
            http_timeout_secs: self.http_timeout_secs,
            call_timeout_secs: self.call_timeout_secs,
            max_page_bytes: self.max_page_bytes,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.http_timeout_secs > 300 {
            return Err(ConfigError::ValidationError(
                "http_timeout_secs must be <= 300 (5 minutes)".to_string(),
            ));
        }

        if self.call_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "call_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.max_page_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_page_bytes must be greater than 0".to_string(),
            ));
        }
        if self.max_page_bytes > 100 * 1024 * 1024 {
            return Err(ConfigError::ValidationError(
                "max_page_bytes must be <= 100MB".to_string(),
            ));
        }

        for (field, url) in [
            ("news_api_url", &self.news_api_url),
            ("notion_api_url", &self.notion_api_url),
            ("hotentry_url", &self.hotentry_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{field} must start with http:// or https://, got '{url}'"
                )));
            }
        }

        if self.notion_version.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "notion_version cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// Environment variable helper functions

fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Blank credentials count as unset
fn get_env_secret(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid u64 value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid usize value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = ToolsConfigBuilder::new().build().unwrap();
        assert_eq!(config.news_api_url, DEFAULT_NEWS_API_URL);
        assert_eq!(config.notion_version, DEFAULT_NOTION_VERSION);
        assert_eq!(config.hotentry_url, DEFAULT_HOTENTRY_URL);
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.call_timeout(), None);
        assert!(config.news_api_key.is_none());
    }

    #[test]
    fn test_builder_validation_timeout() {
        let result = ToolsConfigBuilder::new().http_timeout_secs(0).build();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("http_timeout_secs must be greater than 0")
        );

        let result = ToolsConfigBuilder::new().call_timeout_secs(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_validation_urls() {
        let result = ToolsConfigBuilder::new()
            .news_api_url("ftp://newsapi.org")
            .build();
        assert!(result.unwrap_err().to_string().contains("news_api_url"));
    }

    #[test]
    fn test_base_urls_lose_trailing_slash() {
        let config = ToolsConfigBuilder::new()
            .notion_api_url("http://localhost:9000/")
            .build()
            .unwrap();
        assert_eq!(config.notion_api_url, "http://localhost:9000");
    }

    #[test]
    fn test_explicit_desktop_dir_wins() {
        let config = ToolsConfigBuilder::new()
            .desktop_dir(PathBuf::from("/tmp/desk"))
            .build()
            .unwrap();
        assert_eq!(config.resolve_desktop_dir(), Some(PathBuf::from("/tmp/desk")));
    }

    #[test]
    fn test_env_u64_parsing() {
        assert_eq!(get_env_u64("TOOLHUB_NONEXISTENT_VAR").unwrap(), None);
    }
}
