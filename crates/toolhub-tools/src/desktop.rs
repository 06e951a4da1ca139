//! `clean_desktop_files`: move everything on the desktop to the trash.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use toolhub_core::{Arguments, ContentBlock, HandlerError, HandlerResult, Tool, ToolHandler};
use tracing::{debug, info};

/// Destination for deleted files
#[async_trait]
pub trait Trash: Send + Sync {
    /// Move all `paths` to the trash, resolving only once every move has finished
    async fn delete_all(&self, paths: Vec<PathBuf>) -> Result<(), HandlerError>;
}

/// The operating system's trash, via the `trash` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

#[async_trait]
impl Trash for SystemTrash {
    async fn delete_all(&self, paths: Vec<PathBuf>) -> Result<(), HandlerError> {
        tokio::task::spawn_blocking(move || trash::delete_all(&paths))
            .await
            .map_err(|e| HandlerError::external("trash", format!("worker failed: {e}")))?
            .map_err(|e| HandlerError::external("trash", e))
    }
}

pub struct CleanDesktopTool {
    desktop_dir: PathBuf,
    trash: Arc<dyn Trash>,
}

impl CleanDesktopTool {
    pub fn new(desktop_dir: impl Into<PathBuf>, trash: Arc<dyn Trash>) -> Self {
        Self {
            desktop_dir: desktop_dir.into(),
            trash,
        }
    }

    async fn list_entries(&self) -> Result<Vec<PathBuf>, HandlerError> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.desktop_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            entries.push(entry.path());
        }
        entries.sort();
        Ok(entries)
    }
}

#[async_trait]
impl ToolHandler for CleanDesktopTool {
    async fn call(&self, _args: Arguments) -> HandlerResult {
        let entries = self.list_entries().await?;
        let dir = self.desktop_dir.display();

        if entries.is_empty() {
            debug!(dir = %dir, "Desktop already empty");
            return Ok(vec![ContentBlock::text(format!("{dir} is already clean"))]);
        }

        let count = entries.len();
        self.trash.delete_all(entries).await?;

        info!(dir = %dir, count, "Moved desktop entries to trash");
        Ok(vec![ContentBlock::text(format!(
            "Moved {count} item(s) from {dir} to the trash"
        ))])
    }
}

impl Tool for CleanDesktopTool {
    fn name(&self) -> &str {
        "clean_desktop_files"
    }

    fn description(&self) -> &str {
        "Move every file and folder on the desktop to the trash"
    }
}
