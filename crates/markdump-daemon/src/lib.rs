//! Markdump daemon library exports.
//!
//! This crate provides the CLI binary for markdump.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (start, search, tree)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    generate_secret, load_settings, render_tree, run_search, search_json, show_tree,
    start_daemon,
};
