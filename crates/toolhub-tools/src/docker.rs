//! `docker_prune`: reclaim space with `docker system prune -f`.

use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use toolhub_core::{Arguments, ContentBlock, HandlerError, HandlerResult, Tool, ToolHandler};
use tracing::{debug, info};

/// Captured result of a finished subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` to completion. Failing to start is an error; a non-zero exit is not.
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, HandlerError>;
}

/// Runs commands with `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, HandlerError> {
        debug!(program, ?args, "Spawning command");
        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| HandlerError::external(program, format!("failed to start: {e}")))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

const PROGRAM: &str = "docker";
const ARGS: [&str; 3] = ["system", "prune", "-f"];

pub struct DockerPruneTool {
    runner: Arc<dyn CommandRunner>,
}

impl DockerPruneTool {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl ToolHandler for DockerPruneTool {
    async fn call(&self, _args: Arguments) -> HandlerResult {
        let output = self.runner.run(PROGRAM, &ARGS).await?;

        if !output.success() {
            return Err(HandlerError::Command {
                command: format!("{PROGRAM} {}", ARGS.join(" ")),
                status: output.status_text(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        info!("Docker prune finished");
        let stdout = output.stdout.trim();
        let text = if stdout.is_empty() {
            "Docker prune completed".to_string()
        } else {
            format!("Docker prune completed:\n{stdout}")
        };
        Ok(vec![ContentBlock::text(text)])
    }
}

impl Tool for DockerPruneTool {
    fn name(&self) -> &str {
        "docker_prune"
    }

    fn description(&self) -> &str {
        "Remove unused Docker containers, networks, images and build cache"
    }
}
