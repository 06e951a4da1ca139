//! # Webpage Fetching
//!
//! `fetch_webpage` downloads an http(s) page and renders its main content as
//! plain text. Bodies larger than the configured limit are refused.

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Response, Url};
use std::sync::{Arc, LazyLock};
use toolhub_core::{
    Arguments, ContentBlock, HandlerError, HandlerResult, InputSchema, ParamType, Tool,
    ToolHandler,
};
use tracing::debug;

/// Column width for rendered text
pub const RENDER_WIDTH: usize = 80;

// Opening tags are the name followed by whitespace or `>`, so custom
// elements such as `<main-nav>` never match.
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title(?:\s[^>]*)?>(.*?)</title\s*>").expect("valid regex"));
static MAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main(?:\s[^>]*)?>.*?</main\s*>").expect("valid regex"));
static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<article(?:\s[^>]*)?>.*?</article\s*>").expect("valid regex"));
static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script(?:\s[^>]*)?>.*?</script\s*>|<style(?:\s[^>]*)?>.*?</style\s*>|<noscript(?:\s[^>]*)?>.*?</noscript\s*>")
        .expect("valid regex")
});

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw HTML of `url`
    async fn fetch(&self, url: &Url) -> Result<String, HandlerError>;
}

/// Size-bounded GET with reqwest
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpPageFetcher {
    pub fn new(client: Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, HandlerError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| HandlerError::external("webpage", format!("fetch failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::external(
                "webpage",
                format!("{url} returned HTTP {}", status.as_u16()),
            ));
        }

        read_capped(response, self.max_bytes, "webpage").await
    }
}

/// Read a response body as text, refusing bodies over `max_bytes`.
///
/// The declared length is checked first, then the running total per chunk,
/// so an oversized body is never buffered whole.
pub(crate) async fn read_capped(
    mut response: Response,
    max_bytes: usize,
    service: &str,
) -> Result<String, HandlerError> {
    let too_large = |size: u64| {
        HandlerError::external(
            service,
            format!("response too large: {size} bytes (max {max_bytes})"),
        )
    };

    if let Some(length) = response.content_length()
        && length > max_bytes as u64
    {
        return Err(too_large(length));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| HandlerError::external(service, format!("failed to read body: {e}")))?
    {
        if body.len() + chunk.len() > max_bytes {
            return Err(too_large((body.len() + chunk.len()) as u64));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Parse and restrict to http/https
pub fn parse_web_url(raw: &str) -> Result<Url, HandlerError> {
    let url = Url::parse(raw)
        .map_err(|e| HandlerError::external("webpage", format!("invalid url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HandlerError::external(
            "webpage",
            format!("unsupported scheme '{other}', url must start with http:// or https://"),
        )),
    }
}

/// Page title, whitespace collapsed
pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

/// `<main>` if present, else `<article>`, else the whole document, minus scripts and styles
pub fn main_content(html: &str) -> String {
    let section = MAIN_RE
        .find(html)
        .or_else(|| ARTICLE_RE.find(html))
        .map_or(html, |m| m.as_str());
    NOISE_RE.replace_all(section, "").into_owned()
}

/// Render the main content of `html` as wrapped plain text
pub fn render_text(html: &str) -> Result<String, HandlerError> {
    let content = main_content(html);
    let text = html2text::from_read(content.as_bytes(), RENDER_WIDTH)
        .map_err(|e| HandlerError::InvalidResponse(format!("html2text error: {e}")))?;
    Ok(text.trim().to_string())
}

pub struct FetchWebpageTool {
    fetcher: Arc<dyn PageFetcher>,
}

impl FetchWebpageTool {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl ToolHandler for FetchWebpageTool {
    async fn call(&self, args: Arguments) -> HandlerResult {
        let url = parse_web_url(args.require_str("url")?)?;
        let html = self.fetcher.fetch(&url).await?;
        let text = render_text(&html)?;
        debug!(url = %url, chars = text.len(), "Rendered webpage");

        let mut blocks = Vec::with_capacity(2);
        match extract_title(&html) {
            Some(title) => blocks.push(ContentBlock::text(format!("{title}\n{url}"))),
            None => blocks.push(ContentBlock::text(url.to_string())),
        }
        blocks.push(ContentBlock::text(text));
        Ok(blocks)
    }
}

impl Tool for FetchWebpageTool {
    fn name(&self) -> &str {
        "fetch_webpage"
    }

    fn description(&self) -> &str {
        "Fetch a web page and return its main content as plain text"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::empty().required("url", ParamType::String, "http:// or https:// URL")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use toolhub_core::ToolRegistry;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>
        Release notes
    </title><style>body { color: red }</style></head>
    <body><nav>Home | Blog</nav>
    <main><h1>Version 2</h1><script>track()</script><p>Faster builds.</p></main>
    <footer>Copyright</footer></body></html>"#;

    struct StaticFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &Url) -> Result<String, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PAGE.to_string())
        }
    }

    #[test]
    fn keeps_only_main_content() {
        let text = render_text(PAGE).unwrap();
        assert!(text.contains("Version 2"));
        assert!(text.contains("Faster builds."));
        assert!(!text.contains("Home | Blog"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("track()"));
        assert_eq!(extract_title(PAGE).as_deref(), Some("Release notes"));
    }

    #[test]
    fn custom_elements_are_not_sections() {
        let html = r#"<html><body>
            <main-nav>Menu</main-nav>
            <article-card>Teaser</article-card>
            <article class="post"><p>Body text</p></article>
        </body></html>"#;
        let section = main_content(html);
        assert!(section.contains("Body text"));
        assert!(!section.contains("Menu"));
        assert!(!section.contains("Teaser"));

        let html = "<main-nav>Menu</main-nav><p>Whole page</p>";
        assert_eq!(main_content(html), html);

        let html = "<title-bar>Bar</title-bar><title>Real</title>";
        assert_eq!(extract_title(html).as_deref(), Some("Real"));
    }

    #[test]
    fn only_web_schemes_are_accepted() {
        assert!(parse_web_url("https://example.com").is_ok());
        assert!(parse_web_url("http://example.com/a?b=c").is_ok());
        assert!(parse_web_url("file:///etc/passwd").is_err());
        assert!(parse_web_url("not a url").is_err());
    }

    #[tokio::test]
    async fn tool_renders_title_and_text() {
        let fetcher = Arc::new(StaticFetcher {
            calls: AtomicUsize::new(0),
        });
        let registry = ToolRegistry::new()
            .with_tool(FetchWebpageTool::new(fetcher.clone()))
            .unwrap();

        let result = registry
            .invoke("fetch_webpage", json!({"url": "https://example.com/notes"}))
            .await
            .unwrap();

        assert!(!result.is_error());
        assert_eq!(result.content.len(), 2);
        assert_eq!(
            result.content[0].as_text(),
            Some("Release notes\nhttps://example.com/notes")
        );

        let result = registry
            .invoke("fetch_webpage", json!({"url": "ftp://example.com"}))
            .await
            .unwrap();
        assert!(result.is_error());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn http_fetcher_enforces_size_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/small"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::new(Client::new(), 1024);

        let big = Url::parse(&format!("{}/big", server.uri())).unwrap();
        let err = fetcher.fetch(&big).await.unwrap_err();
        assert!(err.to_string().contains("too large"));

        let small = Url::parse(&format!("{}/small", server.uri())).unwrap();
        assert_eq!(fetcher.fetch(&small).await.unwrap(), "<p>hi</p>");
    }
}
