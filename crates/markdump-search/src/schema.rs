//! Tantivy schema definition for the content index.
//!
//! One document per directory and Markdown document:
//! - id: canonical URL
//! - path: ancestor breadcrumb string
//! - name / body: displayed and highlighted fields
//! - all: composite field every query runs against

use tantivy::schema::{Field, Schema, STORED, STRING, TEXT};

/// Schema field handles for efficient access
#[derive(Debug, Clone)]
pub struct SearchSchema {
    schema: Schema,
    /// Canonical URL (STRING | STORED)
    pub id: Field,
    /// Ancestor titles (STORED)
    pub path: Field,
    /// Display name (TEXT | STORED)
    pub name: Field,
    /// Raw Markdown source, absent for directories (TEXT | STORED)
    pub body: Field,
    /// Name and body combined (TEXT)
    pub all: Field,
}

impl SearchSchema {
    /// Get the underlying Tantivy schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// Build the content search schema.
///
/// TEXT fields are indexed with frequencies and positions by the default
/// tokenizer, which lowercases. Queries built against `all` bypass the
/// tokenizer, so query words must already be lowercase.
pub fn build_search_schema() -> SearchSchema {
    let mut schema_builder = Schema::builder();

    let id = schema_builder.add_text_field("id", STRING | STORED);
    let path = schema_builder.add_text_field("path", STORED);
    let name = schema_builder.add_text_field("name", TEXT | STORED);
    let body = schema_builder.add_text_field("body", TEXT | STORED);
    let all = schema_builder.add_text_field("all", TEXT);

    let schema = schema_builder.build();

    SearchSchema {
        schema,
        id,
        path,
        name,
        body,
        all,
    }
}
