//! Token access gate.
//!
//! A request is let through when its effective token is one of the
//! configured tokens. The effective token is the `token` query parameter if
//! present, else the `markdump_token` cookie. A fresh query token is stored in
//! the cookie so later links work without it.

use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use markdump_types::AuthTokens;

use crate::error::ServiceError;

/// Name of the cookie holding the access token.
pub const TOKEN_COOKIE: &str = "markdump_token";

/// Query parameter carrying an access token.
pub const TOKEN_PARAM: &str = "token";

/// Lifetime of the issued cookie (30 days).
pub const COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Result of checking one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Effective token, if any
    pub token: Option<String>,
    pub authorized: bool,
    /// Whether the effective token should be stored in the cookie
    pub set_cookie: bool,
}

/// Decide whether a request may proceed.
///
/// Empty values count as absent. With the public sentinel configured every
/// request is authorized and no cookie is issued.
pub fn authenticate(
    tokens: &AuthTokens,
    cookie_token: Option<&str>,
    query_token: Option<&str>,
) -> AuthOutcome {
    if tokens.is_public() {
        return AuthOutcome {
            token: None,
            authorized: true,
            set_cookie: false,
        };
    }

    let cookie_token = cookie_token.filter(|t| !t.is_empty());
    let query_token = query_token.filter(|t| !t.is_empty());

    let (token, set_cookie) = match query_token {
        Some(query) if Some(query) != cookie_token => (Some(query), true),
        _ => (cookie_token, false),
    };

    let authorized = token.is_some_and(|t| tokens.contains(t));

    AuthOutcome {
        token: token.map(str::to_string),
        authorized,
        set_cookie,
    }
}

/// Extract the token cookie from request headers.
pub fn parse_token_cookie(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", TOKEN_COOKIE);
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .find_map(|part| part.trim().strip_prefix(prefix.as_str()).map(str::to_string))
}

/// `Set-Cookie` value storing `token`.
pub fn token_cookie_header_value(token: &str) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; Secure; HttpOnly; SameSite=Strict",
        TOKEN_COOKIE, token, COOKIE_MAX_AGE_SECS
    )
}

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Middleware rejecting requests without a valid token.
///
/// The cookie is only written on responses that passed the gate.
pub async fn require_token(
    State(tokens): State<Arc<AuthTokens>>,
    request: Request,
    next: Next,
) -> Response {
    let cookie_token = parse_token_cookie(request.headers());
    let query_token = Query::<TokenQuery>::try_from_uri(request.uri())
        .map(|Query(q)| q.token)
        .unwrap_or_default();

    let outcome = authenticate(&tokens, cookie_token.as_deref(), query_token.as_deref());
    if !outcome.authorized {
        debug!(path = %request.uri().path(), "Rejected request without valid token");
        return ServiceError::Unauthorized.into_response();
    }

    let mut response = next.run(request).await;

    if outcome.set_cookie {
        if let Some(token) = outcome.token.as_deref() {
            match HeaderValue::from_str(&token_cookie_header_value(token)) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => warn!(error = %e, "Token not usable as cookie value"),
            }
        }
    }

    response
}
