//! Search error types.

use thiserror::Error;

/// Errors that can occur while building or querying a snapshot.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Tantivy index error
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
}
