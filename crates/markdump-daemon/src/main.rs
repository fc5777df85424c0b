//! Markdump Daemon
//!
//! Serves a directory of Markdown documents as a searchable website.
//!
//! # Usage
//!
//! ```bash
//! markdump-daemon start [--port PORT] [--host HOST] [--repo DIR]
//! markdump-daemon search QUERY [--repo DIR]
//! markdump-daemon tree [--repo DIR]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/markdump/config.toml)
//! 3. Environment variables (MARKDUMP_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use markdump_daemon::{run_search, show_tree, start_daemon, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { port, host, repo } => {
            start_daemon(
                cli.config.as_deref(),
                port,
                host.as_deref(),
                repo.as_deref(),
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Search { query, repo } => {
            run_search(
                cli.config.as_deref(),
                repo.as_deref(),
                &query,
                cli.log_level.as_deref(),
            )?;
        }
        Commands::Tree { repo } => {
            show_tree(cli.config.as_deref(), repo.as_deref(), cli.log_level.as_deref())?;
        }
    }

    Ok(())
}
