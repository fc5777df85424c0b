//! Service error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use markdump_search::SearchError;
use markdump_tree::TreeError;

/// Errors from rebuilding the published tree and snapshot.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("Tree build failed: {0}")]
    Tree(#[from] TreeError),

    #[error("Index build failed: {0}")]
    Search(#[from] SearchError),

    #[error("Reload task failed: {0}")]
    Join(String),
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("path too long")]
    PathTooLong,

    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Reload error: {0}")]
    Reload(#[from] ReloadError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::PathTooLong => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Render(_)
            | ServiceError::Search(_)
            | ServiceError::Reload(_)
            | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServiceError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ServiceError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServiceError::PathTooLong.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let response = ServiceError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
