//! # markdump-types
//!
//! Shared domain types for markdump.
//!
//! This crate defines the data structures used throughout the system:
//! - Entries: the directory/document content tree
//! - Index documents: the search index input emitted while building the tree
//! - Settings: configuration types
//!
//! ## Usage
//!
//! ```rust
//! use markdump_types::Directory;
//!
//! let root = Directory::root("/srv/notes");
//! assert!(root.is_empty());
//! ```

pub mod config;
pub mod entry;
pub mod error;

pub use config::{AuthTokens, Settings, PUBLIC_TOKEN};
pub use entry::{
    join_url, path_string, Crumb, Directory, Document, Entry, IndexDocument, ROOT_TITLE, ROOT_URL,
};
pub use error::MarkdumpError;
