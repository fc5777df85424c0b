//! # markdump-search
//!
//! Full-text search over the content tree using Tantivy.
//!
//! Every reload builds an immutable in-RAM [`Snapshot`] from the index
//! documents the tree builder emits. Queries combine fuzzy, prefix and
//! substring matching per word and return highlighted excerpts.
//!
//! ## Features
//! - Single-batch snapshot build, no incremental updates
//! - Conjunctive word queries against a composite name + body field
//! - Highlighted name and body fragments per match

pub mod document;
pub mod error;
pub mod highlight;
pub mod index;
pub mod query;
pub mod schema;
pub mod searcher;

pub use document::index_document_to_doc;
pub use error::SearchError;
pub use highlight::{escape_html, fragment, Highlighter, TermLocation};
pub use index::{build_index, build_index_with_config, SearchIndexConfig, Snapshot};
pub use query::{build_query, normalize_query};
pub use schema::{build_search_schema, SearchSchema};
pub use searcher::{search, QueryEngine, QueryMatch, DEFAULT_LIMIT};
