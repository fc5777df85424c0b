//! End-to-end test infrastructure for markdump.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the full directory-to-response pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;

use markdump_service::{build_router, ServerConfig, SiteState};
use markdump_types::AuthTokens;

/// Token accepted by routers built with [`TestHarness::router`].
pub const TEST_TOKEN: &str = "secret1";

/// Secret accepted by the reload endpoint.
pub const TEST_RELOAD_SECRET: &str = "reload-secret";

/// Shared test harness for E2E tests.
///
/// Owns a temporary document directory pre-filled with a small sample site.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Document directory
    pub root: PathBuf,
}

impl TestHarness {
    /// Create a harness with the sample site.
    pub fn new() -> Self {
        let harness = Self::empty();
        harness.write("Home Page.md", "# Welcome\n\nStart with the guides.");
        harness.write(
            "Guides/Getting Started.md",
            "# Getting Started\n\nThe quick brown fox jumps over the lazy dog.",
        );
        harness.write(
            "Guides/Advanced/Tuning.md",
            "Tune the reload coordinator for large trees.",
        );
        harness.write("Guides/diagram.svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"/>");
        harness.write("Café Notes/Déjà vu.md", "Accents are folded in slugs.");
        harness.write(".git/config", "[core]");
        harness
    }

    /// Create a harness with an empty document directory.
    pub fn empty() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("site");
        fs::create_dir_all(&root).expect("Failed to create site dir");
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Write `content` to `rel` below the document directory.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    /// Remove a file or directory below the document directory.
    pub fn remove(&self, rel: &str) {
        let path = self.root.join(rel);
        if path.is_dir() {
            fs::remove_dir_all(path).expect("Failed to remove dir");
        } else {
            fs::remove_file(path).expect("Failed to remove file");
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Load the site state for the document directory.
    pub fn site(&self) -> Arc<SiteState> {
        Arc::new(SiteState::load(&self.root).expect("Failed to load site"))
    }

    /// Router accepting [`TEST_TOKEN`].
    pub fn router(&self, site: Arc<SiteState>) -> Router {
        router_with_tokens(site, TEST_TOKEN)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Router over `site` accepting the whitespace-separated `tokens`.
pub fn router_with_tokens(site: Arc<SiteState>, tokens: &str) -> Router {
    let config = ServerConfig {
        tokens: AuthTokens::parse(tokens),
        reload_secret: TEST_RELOAD_SECRET.to_string(),
        base_url: "/".to_string(),
    };
    build_router(site, &config).expect("Failed to build router")
}

/// GET request without credentials.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// GET request carrying `token` in the access cookie.
pub fn get_with_cookie(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("markdump_token={}", token))
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Collect a response body.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

/// Collect a response body as text.
pub async fn body_text(response: Response) -> String {
    String::from_utf8_lossy(&body_bytes(response).await).into_owned()
}
