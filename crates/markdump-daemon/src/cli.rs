//! CLI argument parsing for the markdump daemon.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Markdump
///
/// Serves a directory of Markdown documents as a searchable website.
#[derive(Parser, Debug)]
#[command(name = "markdump-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/markdump/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the document directory over HTTP
    Start {
        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override HTTP host
        #[arg(long)]
        host: Option<String>,

        /// Override document directory
        #[arg(short, long)]
        repo: Option<String>,
    },

    /// Run one query and print the matches as JSON
    Search {
        /// Free-text query
        query: String,

        /// Override document directory
        #[arg(short, long)]
        repo: Option<String>,
    },

    /// Print the URL tree of the document directory
    Tree {
        /// Override document directory
        #[arg(short, long)]
        repo: Option<String>,
    },
}
