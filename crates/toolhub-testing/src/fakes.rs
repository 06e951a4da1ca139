//! Deterministic stand-ins for the external collaborators of the standard tools.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use toolhub_core::HandlerError;
use toolhub_tools::{
    Article, Block, BlockPage, BrowserLauncher, BrowserSession, CommandOutput, CommandRunner,
    Link, NewsSource, PageContentSource, Trash,
};

/// News source returning the same articles for every query
#[derive(Debug, Default)]
pub struct StubNewsSource {
    articles: Vec<Article>,
    queries: Mutex<Vec<(String, NaiveDate, String)>>,
}

impl StubNewsSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Convenience constructor from `(title, url)` pairs
    pub fn with_articles(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(title, url)| Article {
                    title: title.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        )
    }

    /// `(query, from, sort_by)` of every search
    pub fn queries(&self) -> Vec<(String, NaiveDate, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsSource for StubNewsSource {
    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        sort_by: &str,
    ) -> Result<Vec<Article>, HandlerError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), from, sort_by.to_string()));
        Ok(self.articles.clone())
    }
}

/// Where a [`FakeBrowser`] session should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailAt {
    #[default]
    Never,
    Navigate,
    Extract,
}

#[derive(Debug, Default)]
struct BrowserCounters {
    launched: AtomicUsize,
    closed: AtomicUsize,
    visited: Mutex<Vec<String>>,
}

/// Browser launcher whose sessions serve fixed links and count opens/closes
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    links: Vec<Link>,
    fail_at: FailAt,
    counters: Arc<BrowserCounters>,
}

impl FakeBrowser {
    pub fn new(links: Vec<Link>) -> Self {
        Self {
            links,
            ..Self::default()
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    pub fn launched(&self) -> usize {
        self.counters.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.counters.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, HandlerError> {
        self.counters.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            browser: self.clone(),
        }))
    }
}

struct FakeSession {
    browser: FakeBrowser,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), HandlerError> {
        self.browser
            .counters
            .visited
            .lock()
            .unwrap()
            .push(url.to_string());
        if self.browser.fail_at == FailAt::Navigate {
            return Err(HandlerError::external("browser", "navigation failed"));
        }
        Ok(())
    }

    async fn extract_links(&mut self, _selector: &str) -> Result<Vec<Link>, HandlerError> {
        if self.browser.fail_at == FailAt::Extract {
            return Err(HandlerError::external("browser", "extraction failed"));
        }
        Ok(self.browser.links.clone())
    }

    async fn close(self: Box<Self>) -> Result<(), HandlerError> {
        self.browser.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Block source serving `pages` pages of `per_page` blocks named `item N`
#[derive(Debug)]
pub struct PagedBlockSource {
    pages: usize,
    per_page: usize,
    requests: AtomicUsize,
}

impl PagedBlockSource {
    pub fn new(pages: usize, per_page: usize) -> Self {
        Self {
            pages,
            per_page,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageContentSource for PagedBlockSource {
    async fn list_children(
        &self,
        _page_id: &str,
        cursor: Option<&str>,
    ) -> Result<BlockPage, HandlerError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let index = match cursor {
            None => 0,
            Some(cursor) => cursor
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| HandlerError::InvalidResponse(format!("bad cursor {cursor}")))?,
        };
        // Terminal page: empty, no cursor
        if index >= self.pages {
            return Ok(BlockPage::default());
        }

        let blocks = (0..self.per_page)
            .map(|i| {
                let n = index * self.per_page + i;
                Block {
                    id: format!("block-{n}"),
                    kind: "paragraph".to_string(),
                    text: format!("item {n}"),
                }
            })
            .collect();
        Ok(BlockPage {
            blocks,
            next_cursor: Some(format!("page-{}", index + 1)),
        })
    }
}

/// Trash that records what it was asked to delete without touching the filesystem
#[derive(Debug, Default)]
pub struct RecordingTrash {
    deleted: Mutex<Vec<PathBuf>>,
}

impl RecordingTrash {
    pub fn deleted(&self) -> Vec<PathBuf> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Trash for RecordingTrash {
    async fn delete_all(&self, paths: Vec<PathBuf>) -> Result<(), HandlerError> {
        self.deleted.lock().unwrap().extend(paths);
        Ok(())
    }
}

/// Command runner returning a fixed output and recording command lines
#[derive(Debug)]
pub struct CannedRunner {
    output: CommandOutput,
    commands: Mutex<Vec<String>>,
}

impl CannedRunner {
    pub fn new(output: CommandOutput) -> Self {
        Self {
            output,
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Exit code 0 with `stdout`
    pub fn succeeding(stdout: impl Into<String>) -> Self {
        Self::new(CommandOutput {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        })
    }

    /// Exit `code` with `stderr`
    pub fn failing(code: i32, stderr: impl Into<String>) -> Self {
        Self::new(CommandOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        })
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for CannedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, HandlerError> {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.commands.lock().unwrap().push(line);
        Ok(self.output.clone())
    }
}
