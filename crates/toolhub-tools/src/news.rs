//! # News Search
//!
//! `fetch_news` looks up yesterday's most popular articles for a query.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use toolhub_core::{
    Arguments, ContentBlock, HandlerError, HandlerResult, InputSchema, ParamType, Tool,
    ToolHandler,
};
use tracing::debug;

/// Sort order requested from the news source
pub const SORT_BY_POPULARITY: &str = "popularity";

/// One article as consumed by the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
}

/// Search backend for `fetch_news`
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Articles matching `query` published on or after `from`
    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        sort_by: &str,
    ) -> Result<Vec<Article>, HandlerError>;
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// NewsAPI `/v2/everything` client
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        sort_by: &str,
    ) -> Result<Vec<Article>, HandlerError> {
        let url = format!("{}/v2/everything", self.base_url);
        let from = from.format("%Y-%m-%d").to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("from", from.as_str()),
                ("sortBy", sort_by),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| HandlerError::external("newsapi", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ErrorResponse>().await {
                Ok(ErrorResponse {
                    code,
                    message: Some(message),
                }) => match code {
                    Some(code) => format!("{code}: {message}"),
                    None => message,
                },
                _ => "no error details".to_string(),
            };
            return Err(HandlerError::external(
                "newsapi",
                format!("HTTP {}: {detail}", status.as_u16()),
            ));
        }

        let body: EverythingResponse = response
            .json()
            .await
            .map_err(|e| HandlerError::InvalidResponse(format!("newsapi body: {e}")))?;

        Ok(body
            .articles
            .into_iter()
            .filter_map(|raw| {
                Some(Article {
                    title: raw.title.unwrap_or_default(),
                    url: raw.url?,
                })
            })
            .collect())
    }
}

/// The `fetch_news` tool
pub struct FetchNewsTool {
    source: Arc<dyn NewsSource>,
    today: Option<NaiveDate>,
}

impl FetchNewsTool {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self {
            source,
            today: None,
        }
    }

    /// Pin "today" instead of reading the local clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn from_date(&self) -> NaiveDate {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        today.pred_opt().unwrap_or(today)
    }
}

/// Render articles as the tool's text payload
pub fn format_articles(query: &str, articles: &[Article]) -> String {
    if articles.is_empty() {
        return format!("No news found for {query}");
    }

    let mut text = format!("News for {query}:");
    for article in articles {
        text.push('\n');
        text.push_str(&article.title);
        text.push(' ');
        text.push_str(&article.url);
    }
    text
}

#[async_trait]
impl ToolHandler for FetchNewsTool {
    async fn call(&self, args: Arguments) -> HandlerResult {
        let query = args.require_str("query")?;
        let from = self.from_date();

        debug!(query = %query, from = %from, "Searching news");
        let articles = self
            .source
            .search(query, from, SORT_BY_POPULARITY)
            .await?;

        Ok(vec![ContentBlock::text(format_articles(query, &articles))])
    }
}

impl Tool for FetchNewsTool {
    fn name(&self) -> &str {
        "fetch_news"
    }

    fn description(&self) -> &str {
        "Fetch yesterday's most popular news articles matching a query"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::empty().required("query", ParamType::String, "Keywords to search for")
    }
}
