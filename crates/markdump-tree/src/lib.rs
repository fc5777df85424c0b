//! Content tree library for markdump.
//!
//! Provides:
//! - Slug generation for URL segments
//! - The Markdown renderer trait and its pulldown-cmark implementation
//! - The recursive tree builder that also emits search index input

pub mod builder;
pub mod render;
pub mod slug;

pub use builder::{is_markup, BuildOutput, TreeBuilder, TreeError, MARKUP_EXTENSIONS};
pub use render::{MarkdownRenderer, Renderer};
pub use slug::slugify;
