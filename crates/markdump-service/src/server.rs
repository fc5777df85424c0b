//! HTTP server setup and handlers.
//!
//! Pages, search and the query API sit behind the token gate. The
//! stylesheet and the reload endpoint do not; reload checks its own secret.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::middleware;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{debug, info, warn};

use markdump_search::QueryMatch;
use markdump_types::AuthTokens;

use crate::auth::require_token;
use crate::error::ServiceError;
use crate::router::{resolve, Route};
use crate::state::{reload_in_background, SiteState};
use crate::templates::{Pages, STYLESHEET};

/// Settings the HTTP layer needs besides the site itself.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tokens: AuthTokens,
    /// Secret expected by `/reload`. Empty disables the endpoint.
    pub reload_secret: String,
    /// Prefix for links in rendered pages
    pub base_url: String,
}

#[derive(Clone)]
struct AppState {
    site: Arc<SiteState>,
    pages: Arc<Pages>,
    reload_secret: Arc<str>,
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    s: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReloadQuery {
    secret: Option<String>,
}

/// Build the application router.
pub fn build_router(site: Arc<SiteState>, config: &ServerConfig) -> Result<Router, ServiceError> {
    let state = AppState {
        site,
        pages: Arc::new(Pages::new(&config.base_url)?),
        reload_secret: Arc::from(config.reload_secret.as_str()),
    };
    let tokens = Arc::new(config.tokens.clone());

    let gated = Router::new()
        .route("/search", get(search_api))
        .route("/search/*input", get(search_api_path))
        .route("/", get(page))
        .route("/*path", get(page))
        .route_layer(middleware::from_fn_with_state(tokens, require_token));

    let open = Router::new()
        .route("/static/style.css", get(stylesheet))
        .route("/reload", get(reload));

    Ok(open.merge(gated).with_state(state))
}

/// Run the HTTP server until `shutdown_signal` resolves.
pub async fn run_server_with_shutdown<F>(
    addr: SocketAddr,
    site: Arc<SiteState>,
    config: ServerConfig,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Starting HTTP server on {} (with graceful shutdown)", addr);

    let app = build_router(site, &config)?;
    let listener = TcpListener::bind(addr).await?;

    info!(addr = %listener.local_addr()?, "HTTP server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn stylesheet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

async fn reload(
    State(state): State<AppState>,
    Query(query): Query<ReloadQuery>,
) -> Result<String, ServiceError> {
    let accepted = !state.reload_secret.is_empty()
        && query.secret.as_deref() == Some(&*state.reload_secret);
    if !accepted {
        warn!("Reload requested with wrong secret");
        return Err(ServiceError::Forbidden);
    }

    let version = reload_in_background(state.site.clone()).await?;
    Ok(format!("reloaded version {}", version))
}

async fn search_api(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<QueryMatch>>, ServiceError> {
    let matches = run_search(&state, query.q.unwrap_or_default()).await?;
    Ok(Json(matches))
}

async fn search_api_path(
    State(state): State<AppState>,
    Path(input): Path<String>,
) -> Result<Json<Vec<QueryMatch>>, ServiceError> {
    let input = input.trim_start_matches('/').to_string();
    let matches = run_search(&state, input).await?;
    Ok(Json(matches))
}

async fn page(State(state): State<AppState>, request: Request) -> Result<Response, ServiceError> {
    let search = Query::<PageQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.s)
        .filter(|s| !s.is_empty());

    if let Some(search) = search {
        let search = search.trim().to_string();
        let matches = run_search(&state, search.clone()).await?;
        return Ok(Html(state.pages.search(&search, &matches)?).into_response());
    }

    let published = state.site.current();
    let file = match resolve(&published.root, request.uri().path())? {
        Route::Directory(dir) => {
            return Ok(Html(state.pages.directory(dir)?).into_response());
        }
        Route::Document { dir, doc } => {
            return Ok(Html(state.pages.document(dir, doc)?).into_response());
        }
        Route::PassThrough(file) => file,
    };
    drop(published);

    serve_file(file, request).await
}

async fn run_search(state: &AppState, input: String) -> Result<Vec<QueryMatch>, ServiceError> {
    let site = state.site.clone();
    let matches = tokio::task::spawn_blocking(move || site.search(&input))
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))??;
    Ok(matches)
}

/// Serve a regular file as is.
async fn serve_file(path: PathBuf, request: Request) -> Result<Response, ServiceError> {
    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        debug!(path = ?path, "No file to pass through");
        return Err(ServiceError::NotFound);
    }

    let response = ServeFile::new(&path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    Ok(response.map(Body::new))
}
