//! Command implementations for the markdump daemon.
//!
//! Handles:
//! - start: Load config, build the site, serve HTTP until shutdown
//! - search: Build the site once and print matches as JSON
//! - tree: Build the site once and print its URL tree

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use base64::Engine;
use rand::RngCore;
use tokio::signal;
use tracing::{error, info, warn};

use markdump_search::{build_index, search};
use markdump_service::{run_server_with_shutdown, ServerConfig, SiteState};
use markdump_tree::TreeBuilder;
use markdump_types::{Directory, Entry, Settings};

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    repo_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(repo) = repo_override {
        settings.repo_dir = repo.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Random reload secret: 16 bytes, URL-safe base64 without padding.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Start the HTTP server.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Build the initial tree and snapshot
/// 3. Serve until SIGINT/SIGTERM
pub async fn start_daemon(
    config_path: Option<&str>,
    port_override: Option<u16>,
    host_override: Option<&str>,
    repo_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = load_settings(config_path, repo_override, log_level_override)?;
    if let Some(port) = port_override {
        settings.http_port = port;
    }
    if let Some(host) = host_override {
        settings.http_host = host.to_string();
    }

    init_logging(&settings.log_level)?;
    settings.validate().context("Invalid configuration")?;

    let tokens = settings.tokens();
    let reload_secret = match settings.reload_secret.clone().filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => {
            let secret = generate_secret();
            warn!(secret = %secret, "Generated temporary reload secret");
            secret
        }
    };

    info!("Markdump starting...");
    info!("Configuration:");
    info!("  Document directory: {}", settings.repo_dir);
    info!("  HTTP address: {}", settings.http_addr());
    info!("  Base URL: {}", settings.base_url);
    info!("  Log level: {}", settings.log_level);
    if tokens.is_public() {
        info!("  Access: public");
    } else {
        info!("  Access: {} token(s)", tokens.len());
    }

    let repo_dir = settings.expanded_repo_dir();
    let site = tokio::task::spawn_blocking(move || SiteState::load(repo_dir))
        .await
        .context("Initial build task failed")?
        .context("Failed to build site")?;
    let site = Arc::new(site);

    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("Invalid HTTP address")?;

    let config = ServerConfig {
        tokens,
        reload_secret,
        base_url: settings.base_url.clone(),
    };

    run_server_with_shutdown(addr, site, config, shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Build the site under `location` and run one query, as pretty JSON.
pub fn search_json(location: &Path, query: &str) -> Result<String> {
    let output = TreeBuilder::default()
        .build(location)
        .context("Failed to build content tree")?;
    let snapshot = build_index(&output.documents).context("Failed to build search index")?;
    let matches = search(&snapshot, query).context("Search failed")?;
    serde_json::to_string_pretty(&matches).context("Failed to encode matches")
}

/// Handle the search command.
pub fn run_search(
    config_path: Option<&str>,
    repo_override: Option<&str>,
    query: &str,
    log_level_override: Option<&str>,
) -> Result<()> {
    let settings = load_settings(config_path, repo_override, log_level_override.or(Some("warn")))?;
    init_logging(&settings.log_level)?;

    println!("{}", search_json(&settings.expanded_repo_dir(), query)?);
    Ok(())
}

/// One line per entry, indented by depth. Directories end in `/`.
pub fn render_tree(root: &Directory) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", root.url, root.title);
    render_children(root, 1, &mut out);
    out
}

fn render_children(dir: &Directory, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for child in dir.children() {
        match child {
            Entry::Directory(subdir) => {
                let _ = writeln!(out, "{}{}/  {}", indent, subdir.url, subdir.title);
                render_children(subdir, depth + 1, out);
            }
            Entry::Document(doc) => {
                let _ = writeln!(out, "{}{}  {}", indent, doc.url, doc.title);
            }
        }
    }
}

/// Handle the tree command.
pub fn show_tree(
    config_path: Option<&str>,
    repo_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let settings = load_settings(config_path, repo_override, log_level_override.or(Some("warn")))?;
    init_logging(&settings.log_level)?;

    let output = TreeBuilder::default()
        .build(&settings.expanded_repo_dir())
        .context("Failed to build content tree")?;
    print!("{}", render_tree(&output.root));
    Ok(())
}
