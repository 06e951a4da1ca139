//! # Browser Sessions
//!
//! Page scraping goes through a [`BrowserLauncher`] that hands out
//! [`BrowserSession`]s. Sessions are always used via [`with_session`], which
//! closes the session exactly once whether the work succeeds or fails.
//!
//! The production launcher, [`HttpBrowserLauncher`], fetches the page over
//! HTTP and matches anchors with a small CSS selector subset
//! (`tag`, `tag.class`, `.class`, and a descendant pair such as
//! `h3.entrylist-contents-title a`).

use async_trait::async_trait;
use futures::future::BoxFuture;
use regex::Regex;
use reqwest::{Client, Url};
use toolhub_core::HandlerError;
use tracing::{debug, warn};

use crate::webpage::read_capped;

/// A link extracted from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub title: String,
    pub href: String,
}

/// An open browsing context
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), HandlerError>;

    /// Anchors matching `selector` on the current page, in document order
    async fn extract_links(&mut self, selector: &str) -> Result<Vec<Link>, HandlerError>;

    /// Release the session. Called exactly once by [`with_session`].
    async fn close(self: Box<Self>) -> Result<(), HandlerError>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, HandlerError>;
}

/// Run `work` against a fresh session and close it on every exit path.
///
/// A close failure after successful work is returned as the error; after
/// failed work the work's error wins and the close failure is logged. If the
/// returned future is dropped early, for example by a call timeout, the
/// session is closed on a background task instead.
pub async fn with_session<T, F>(launcher: &dyn BrowserLauncher, work: F) -> Result<T, HandlerError>
where
    T: Send,
    F: for<'s> FnOnce(&'s mut dyn BrowserSession) -> BoxFuture<'s, Result<T, HandlerError>>
        + Send,
{
    let mut guard = SessionGuard {
        session: Some(launcher.launch().await?),
    };
    let outcome = match guard.session.as_deref_mut() {
        Some(session) => work(session).await,
        None => Err(HandlerError::external("browser", "session already closed")),
    };
    let closed = guard.close().await;

    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "Failed to close browser session after error");
            Err(err)
        }
    }
}

/// Owns a live session until it has been closed
struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    async fn close(&mut self) -> Result<(), HandlerError> {
        match self.session.take() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Closing abandoned browser session in the background");
                handle.spawn(async move {
                    if let Err(err) = session.close().await {
                        warn!(error = %err, "Failed to close abandoned browser session");
                    }
                });
            }
            Err(_) => warn!("Browser session dropped outside a runtime, not closed"),
        }
    }
}

/// One compound selector: optional tag plus optional class
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    class: Option<String>,
}

impl Compound {
    fn parse(part: &str) -> Option<Self> {
        let (tag, class) = match part.split_once('.') {
            Some((tag, class)) => (tag, Some(class)),
            None => (part, None),
        };
        let valid = |s: &str| {
            s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if !valid(tag) || class.is_some_and(|c| c.is_empty() || !valid(c)) {
            return None;
        }
        if tag.is_empty() && class.is_none() {
            return None;
        }
        Some(Self {
            tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            class: class.map(str::to_string),
        })
    }

    fn element_regex(&self) -> Result<Regex, HandlerError> {
        let tag = self
            .tag
            .as_deref()
            .map(regex::escape)
            .unwrap_or_else(|| "[a-zA-Z][a-zA-Z0-9]*".to_string());
        // No backreferences in `regex`: untagged selectors stop at the first end tag
        let pattern = match &self.tag {
            Some(_) => format!(r"(?is)<({tag})\b([^>]*)>(.*?)</{tag}\s*>"),
            None => format!(r"(?is)<({tag})\b([^>]*)>(.*?)</[a-zA-Z][a-zA-Z0-9]*\s*>"),
        };
        Regex::new(&pattern)
            .map_err(|e| HandlerError::external("browser", format!("bad selector: {e}")))
    }

    fn matches_attrs(&self, attrs: &str) -> bool {
        match &self.class {
            Some(class) => extract_attr(attrs, "class")
                .is_some_and(|value| value.split_whitespace().any(|c| c == class)),
            None => true,
        }
    }

    /// `(attrs, inner_html)` of every matching element in `html`
    fn find<'h>(&self, html: &'h str) -> Result<Vec<(&'h str, &'h str)>, HandlerError> {
        let re = self.element_regex()?;
        Ok(re
            .captures_iter(html)
            .filter_map(|caps| {
                let attrs = caps.get(2)?.as_str();
                let inner = caps.get(3)?.as_str();
                self.matches_attrs(attrs).then_some((attrs, inner))
            })
            .collect())
    }
}

/// Parsed `container target` selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSelector {
    container: Option<Compound>,
    target: Compound,
}

impl LinkSelector {
    pub fn parse(selector: &str) -> Result<Self, HandlerError> {
        let unsupported =
            || HandlerError::external("browser", format!("unsupported selector '{selector}'"));

        let parts: Vec<&str> = selector.split_whitespace().collect();
        match parts.as_slice() {
            [target] => Ok(Self {
                container: None,
                target: Compound::parse(target).ok_or_else(unsupported)?,
            }),
            [container, target] => Ok(Self {
                container: Some(Compound::parse(container).ok_or_else(unsupported)?),
                target: Compound::parse(target).ok_or_else(unsupported)?,
            }),
            _ => Err(unsupported()),
        }
    }

    /// Extract links from `html`, resolving relative hrefs against `base`
    pub fn extract(&self, html: &str, base: Option<&Url>) -> Result<Vec<Link>, HandlerError> {
        let scopes: Vec<&str> = match &self.container {
            Some(container) => container
                .find(html)?
                .into_iter()
                .map(|(_, inner)| inner)
                .collect(),
            None => vec![html],
        };

        let mut links = Vec::new();
        for scope in scopes {
            for (attrs, inner) in self.target.find(scope)? {
                let Some(href) = extract_attr(attrs, "href") else {
                    continue;
                };
                let href = match base {
                    Some(base) => base
                        .join(&href)
                        .map(|u| u.to_string())
                        .unwrap_or(href),
                    None => href,
                };
                links.push(Link {
                    title: strip_html_tags(inner),
                    href,
                });
            }
        }
        Ok(links)
    }
}

/// Extract the value of an HTML attribute from a tag's attribute text.
fn extract_attr(attrs: &str, attr: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let pattern = format!("{attr}={quote}");
        if let Some(start) = find_attr_start(attrs, &pattern) {
            let end = attrs[start..].find(quote)? + start;
            return Some(html_decode(&attrs[start..end]));
        }
    }
    None
}

fn find_attr_start(attrs: &str, pattern: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = attrs[offset..].find(pattern) {
        let abs = offset + pos;
        // Reject matches inside longer names such as data-href
        let boundary = abs == 0
            || attrs[..abs]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        if boundary {
            return Some(abs + pattern.len());
        }
        offset = abs + pattern.len();
    }
    None
}

/// Strip HTML tags from a string, returning plain text.
fn strip_html_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    html_decode(&collapsed)
}

/// Decode common HTML entities.
fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Launches [`HttpBrowserSession`]s sharing one HTTP client
#[derive(Debug, Clone)]
pub struct HttpBrowserLauncher {
    client: Client,
    max_bytes: usize,
}

impl HttpBrowserLauncher {
    /// Pages larger than `max_bytes` fail to load
    pub fn new(client: Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl BrowserLauncher for HttpBrowserLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, HandlerError> {
        debug!("Opening HTTP browser session");
        Ok(Box::new(HttpBrowserSession {
            client: self.client.clone(),
            max_bytes: self.max_bytes,
            page: None,
        }))
    }
}

struct LoadedPage {
    url: Url,
    html: String,
}

/// Session that loads pages with plain GET requests
pub struct HttpBrowserSession {
    client: Client,
    max_bytes: usize,
    page: Option<LoadedPage>,
}

#[async_trait]
impl BrowserSession for HttpBrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<(), HandlerError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HandlerError::external("browser", format!("navigation failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::external(
                "browser",
                format!("{url} returned HTTP {}", status.as_u16()),
            ));
        }

        let final_url = response.url().clone();
        let html = read_capped(response, self.max_bytes, "browser").await?;

        debug!(url = %final_url, bytes = html.len(), "Page loaded");
        self.page = Some(LoadedPage {
            url: final_url,
            html,
        });
        Ok(())
    }

    async fn extract_links(&mut self, selector: &str) -> Result<Vec<Link>, HandlerError> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| HandlerError::external("browser", "no page loaded"))?;
        LinkSelector::parse(selector)?.extract(&page.html, Some(&page.url))
    }

    async fn close(self: Box<Self>) -> Result<(), HandlerError> {
        debug!("Closing HTTP browser session");
        Ok(())
    }
}
