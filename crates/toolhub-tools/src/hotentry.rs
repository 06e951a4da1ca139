//! `get_it_hotentry`: titles and links from the IT hot-entry list.

use async_trait::async_trait;
use std::sync::Arc;
use toolhub_core::{Arguments, ContentBlock, HandlerResult, Tool, ToolHandler};
use tracing::debug;

use crate::browser::{BrowserLauncher, Link, with_session};

pub const ENTRY_SELECTOR: &str = "h3.entrylist-contents-title a";

pub struct HotEntryTool {
    launcher: Arc<dyn BrowserLauncher>,
    url: String,
}

impl HotEntryTool {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, url: impl Into<String>) -> Self {
        Self {
            launcher,
            url: url.into(),
        }
    }
}

fn format_entries(links: &[Link]) -> String {
    if links.is_empty() {
        return "No hot entries found".to_string();
    }
    links
        .iter()
        .map(|link| format!("{} {}", link.title, link.href))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ToolHandler for HotEntryTool {
    async fn call(&self, _args: Arguments) -> HandlerResult {
        let url = self.url.clone();
        let links = with_session(self.launcher.as_ref(), move |session| {
            Box::pin(async move {
                session.navigate(&url).await?;
                session.extract_links(ENTRY_SELECTOR).await
            })
        })
        .await?;

        debug!(entries = links.len(), "Collected hot entries");
        Ok(vec![ContentBlock::text(format_entries(&links))])
    }
}

impl Tool for HotEntryTool {
    fn name(&self) -> &str {
        "get_it_hotentry"
    }

    fn description(&self) -> &str {
        "List the current IT hot entries (title and link) from Hatena Bookmark"
    }
}
