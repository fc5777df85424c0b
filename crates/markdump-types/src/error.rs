//! Error types shared across markdump crates.

use thiserror::Error;

/// Unified error type for markdump configuration and lookups.
#[derive(Debug, Error)]
pub enum MarkdumpError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
