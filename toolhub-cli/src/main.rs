use clap::{Parser, Subcommand};

mod commands;

use commands::{list_tools, run_http, run_stdio};

#[derive(Parser, Debug)]
#[command(name = "toolhub", version)]
#[command(about = "toolhub - utility tools served over MCP stdio, plus an HTTP demo endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve tools over MCP on stdin/stdout (default)
    Stdio,
    /// Run the HTTP demo endpoint
    Http {
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Listen address (overrides TOOLHUB_HTTP_HOST)
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the enabled tools and their input schemas
    Tools,
}

#[tokio::main]
async fn main() {
    // JSON logs on stderr; stdout carries the MCP stream.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .json()
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Stdio) {
        Commands::Stdio => run_stdio().await,
        Commands::Http { port, host } => run_http(port, host).await,
        Commands::Tools => list_tools(),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "toolhub failed");
        std::process::exit(1);
    }
}
