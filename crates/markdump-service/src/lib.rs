//! HTTP service for markdump.
//!
//! Provides:
//! - Token access gate for pages, search and the query API
//! - Path resolution against the published content tree
//! - The reload coordinator publishing tree and snapshot pairs
//! - Embedded page templates and stylesheet
//! - The axum server with graceful shutdown

pub mod auth;
pub mod error;
pub mod router;
pub mod server;
pub mod state;
pub mod templates;

pub use auth::{authenticate, AuthOutcome, TOKEN_COOKIE, TOKEN_PARAM};
pub use error::{ReloadError, ServiceError};
pub use router::{resolve, Route, RouteError, MAX_SEGMENTS};
pub use server::{build_router, run_server_with_shutdown, ServerConfig};
pub use state::{reload_in_background, Published, SiteState};
pub use templates::Pages;
