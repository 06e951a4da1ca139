//! # Notion Page Content
//!
//! `fetch_notion_page` reads every child block of a page. The block list is
//! paginated; the tool follows the cursor until the source reports no further
//! pages and only then renders the accumulated blocks, in order.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use toolhub_core::{
    Arguments, ContentBlock, HandlerError, HandlerResult, InputSchema, ParamType, Tool,
    ToolHandler,
};
use tracing::debug;

/// Upper bound on pages fetched for one invocation
pub const MAX_PAGES: usize = 1000;

/// One content block, reduced to its plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub kind: String,
    pub text: String,
}

/// One page of children plus the cursor for the next page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockPage {
    pub blocks: Vec<Block>,
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait PageContentSource: Send + Sync {
    async fn list_children(
        &self,
        page_id: &str,
        cursor: Option<&str>,
    ) -> Result<BlockPage, HandlerError>;
}

#[derive(Debug, Deserialize)]
struct ChildrenResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Plain text of a raw Notion block object
fn block_text(block: &Value, kind: &str) -> String {
    let body = &block[kind];
    if let Some(rich_text) = body["rich_text"].as_array() {
        return rich_text
            .iter()
            .filter_map(|span| span["plain_text"].as_str())
            .collect();
    }
    // child_page / child_database carry a bare title
    body["title"].as_str().unwrap_or_default().to_string()
}

/// Notion `GET /v1/blocks/{id}/children` client
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    base_url: String,
    api_key: String,
    version: String,
}

impl NotionClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            version: version.into(),
        }
    }
}

#[async_trait]
impl PageContentSource for NotionClient {
    async fn list_children(
        &self,
        page_id: &str,
        cursor: Option<&str>,
    ) -> Result<BlockPage, HandlerError> {
        let url = format!("{}/v1/blocks/{page_id}/children", self.base_url);
        let mut request = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.version)
            .query(&[("page_size", "100")]);
        if let Some(cursor) = cursor {
            request = request.query(&[("start_cursor", cursor)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HandlerError::external("notion", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<NotionErrorBody>().await {
                Ok(NotionErrorBody {
                    code: Some(code),
                    message: Some(message),
                }) => format!("{code}: {message}"),
                Ok(NotionErrorBody {
                    message: Some(message),
                    ..
                }) => message,
                _ => "no error details".to_string(),
            };
            return Err(HandlerError::external(
                "notion",
                format!("HTTP {}: {detail}", status.as_u16()),
            ));
        }

        let body: ChildrenResponse = response
            .json()
            .await
            .map_err(|e| HandlerError::InvalidResponse(format!("notion body: {e}")))?;

        let blocks = body
            .results
            .iter()
            .map(|raw| {
                let kind = raw["type"].as_str().unwrap_or("unsupported");
                Block {
                    id: raw["id"].as_str().unwrap_or_default().to_string(),
                    kind: kind.to_string(),
                    text: block_text(raw, kind),
                }
            })
            .collect();

        Ok(BlockPage {
            blocks,
            next_cursor: body.next_cursor.filter(|_| body.has_more),
        })
    }
}

/// Follow the cursor chain and collect every block in page order.
///
/// # Errors
///
/// The first page error aborts the walk, as does exceeding [`MAX_PAGES`].
pub async fn collect_all_blocks(
    source: &dyn PageContentSource,
    page_id: &str,
) -> Result<Vec<Block>, HandlerError> {
    let mut blocks = Vec::new();
    let mut cursor: Option<String> = None;

    for page_number in 1..=MAX_PAGES {
        let page = source.list_children(page_id, cursor.as_deref()).await?;
        debug!(
            page_id,
            page = page_number,
            blocks = page.blocks.len(),
            "Fetched block page"
        );
        blocks.extend(page.blocks);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(blocks),
        }
    }

    Err(HandlerError::external(
        "notion",
        format!("page {page_id} has more than {MAX_PAGES} pages of blocks"),
    ))
}

fn valid_page_id(page_id: &str) -> bool {
    !page_id.is_empty() && page_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

pub struct FetchNotionPageTool {
    source: Arc<dyn PageContentSource>,
}

impl FetchNotionPageTool {
    pub fn new(source: Arc<dyn PageContentSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ToolHandler for FetchNotionPageTool {
    async fn call(&self, args: Arguments) -> HandlerResult {
        let page_id = args.require_str("page_id")?;
        if !valid_page_id(page_id) {
            return Err(HandlerError::InvalidArgument {
                field: "page_id".to_string(),
                reason: format!("'{page_id}' is not a valid page id"),
            });
        }

        let blocks = collect_all_blocks(self.source.as_ref(), page_id).await?;
        if blocks.is_empty() {
            return Ok(vec![ContentBlock::text(format!("Page {page_id} is empty"))]);
        }

        let text = blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(vec![ContentBlock::text(text)])
    }
}

impl Tool for FetchNotionPageTool {
    fn name(&self) -> &str {
        "fetch_notion_page"
    }

    fn description(&self) -> &str {
        "Fetch the full text content of a Notion page"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::empty().required("page_id", ParamType::String, "Notion page ID")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use toolhub_core::ToolRegistry;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serves `pages` pages of `per_page` blocks, cursors `c1`, `c2`, ...
    struct PagedSource {
        pages: usize,
        per_page: usize,
        cursors_seen: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl PageContentSource for PagedSource {
        async fn list_children(
            &self,
            _page_id: &str,
            cursor: Option<&str>,
        ) -> Result<BlockPage, HandlerError> {
            self.cursors_seen
                .lock()
                .unwrap()
                .push(cursor.map(str::to_string));

            let index = match cursor {
                None => 0,
                Some(c) => c.trim_start_matches('c').parse::<usize>().unwrap(),
            };
            if index >= self.pages {
                return Ok(BlockPage::default());
            }

            let blocks = (0..self.per_page)
                .map(|i| {
                    let n = index * self.per_page + i;
                    Block {
                        id: format!("b{n}"),
                        kind: "paragraph".to_string(),
                        text: format!("item {n}"),
                    }
                })
                .collect();
            Ok(BlockPage {
                blocks,
                next_cursor: Some(format!("c{}", index + 1)),
            })
        }
    }

    #[tokio::test]
    async fn accumulates_every_page_in_order() {
        let source = Arc::new(PagedSource {
            pages: 3,
            per_page: 10,
            cursors_seen: Mutex::new(Vec::new()),
        });
        let registry = ToolRegistry::new()
            .with_tool(FetchNotionPageTool::new(source.clone()))
            .unwrap();

        let result = registry
            .invoke("fetch_notion_page", json!({"page_id": "abc123"}))
            .await
            .unwrap();

        assert!(!result.is_error());
        let lines: Vec<String> = result.text().lines().map(str::to_string).collect();
        let expected: Vec<String> = (0..30).map(|n| format!("item {n}")).collect();
        assert_eq!(lines, expected);

        let cursors = source.cursors_seen.lock().unwrap();
        assert_eq!(cursors.len(), 4);
        assert_eq!(cursors[0], None);
        assert_eq!(cursors[3].as_deref(), Some("c3"));
    }

    #[tokio::test]
    async fn rejects_path_like_page_ids() {
        let source = Arc::new(PagedSource {
            pages: 0,
            per_page: 0,
            cursors_seen: Mutex::new(Vec::new()),
        });
        let registry = ToolRegistry::new()
            .with_tool(FetchNotionPageTool::new(source.clone()))
            .unwrap();

        let result = registry
            .invoke("fetch_notion_page", json!({"page_id": "../users"}))
            .await
            .unwrap();

        assert!(result.is_error());
        assert_eq!(
            result.text(),
            "Tool 'fetch_notion_page' failed: invalid argument 'page_id': '../users' is not a valid page id"
        );
        assert!(!result.text().contains("notion call failed"));
        assert!(source.cursors_seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn notion_client_follows_cursor() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/blocks/page-1/children"))
            .and(query_param("start_cursor", "next-1"))
            .and(header("Notion-Version", "2022-06-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "results": [
                    {"id": "b3", "type": "child_page", "child_page": {"title": "Sub page"}}
                ],
                "next_cursor": null,
                "has_more": false
            })))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/blocks/page-1/children"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "results": [
                    {"id": "b1", "type": "heading_1", "heading_1": {"rich_text": [
                        {"plain_text": "Weekly "}, {"plain_text": "notes"}
                    ]}},
                    {"id": "b2", "type": "divider", "divider": {}}
                ],
                "next_cursor": "next-1",
                "has_more": true
            })))
            .mount(&server)
            .await;

        let client = NotionClient::new(Client::new(), server.uri(), "secret", "2022-06-28");
        let blocks = collect_all_blocks(&client, "page-1").await.unwrap();

        let texts: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Weekly notes", "", "Sub page"]);
        assert_eq!(blocks[0].kind, "heading_1");
    }

    #[tokio::test]
    async fn notion_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "object": "error",
                "status": 404,
                "code": "object_not_found",
                "message": "Could not find block"
            })))
            .mount(&server)
            .await;

        let client = NotionClient::new(Client::new(), server.uri(), "secret", "2022-06-28");
        let err = client.list_children("missing", None).await.unwrap_err();
        assert!(err.to_string().contains("object_not_found"));
    }
}
