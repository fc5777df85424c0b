//! Query execution over a snapshot.
//!
//! Normalizes the input, runs the boolean fuzzy/prefix/substring query and
//! assembles highlighted matches.

use serde::Serialize;
use tantivy::collector::TopDocs;
use tantivy::schema::{Field, Value};
use tantivy::TantivyDocument;
use tracing::{debug, info};

use crate::error::SearchError;
use crate::highlight::{escape_html, fragment, Highlighter};
use crate::index::Snapshot;
use crate::query::{build_query, normalize_query};

/// Default maximum number of matches per query.
pub const DEFAULT_LIMIT: usize = 10;

/// One search hit, ready for JSON or template output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    /// URL of the directory or document
    pub href: String,
    /// Ancestor titles, without the name
    pub path: String,
    /// Highlighted name (HTML)
    pub name: String,
    /// Highlighted body excerpt (HTML); empty for directories
    pub content: String,
}

/// Runs free-text queries against snapshots.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    limit: usize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QueryEngine {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Search `snapshot` for `input`.
    ///
    /// Input without usable words yields no matches and never reaches the
    /// index.
    pub fn search(&self, snapshot: &Snapshot, input: &str) -> Result<Vec<QueryMatch>, SearchError> {
        let words = normalize_query(input);
        let schema = snapshot.schema();

        let Some(query) = build_query(schema, &words)? else {
            debug!(input, "Query has no usable words");
            return Ok(Vec::new());
        };

        let searcher = snapshot.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(self.limit))?;

        let highlighter = Highlighter::new(&words);
        let mut name_analyzer = searcher.index().tokenizer_for_field(schema.name)?;
        let mut body_analyzer = searcher.index().tokenizer_for_field(schema.body)?;

        let mut matches = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;

            let name = stored_text(&doc, schema.name).unwrap_or_default();
            let name_html = match fragment(&highlighter.locate(&mut name_analyzer, &name), &name) {
                html if html.is_empty() => escape_html(&name),
                html => html,
            };

            let content = stored_text(&doc, schema.body)
                .map(|body| fragment(&highlighter.locate(&mut body_analyzer, &body), &body))
                .unwrap_or_default();

            matches.push(QueryMatch {
                href: stored_text(&doc, schema.id).unwrap_or_default(),
                path: stored_text(&doc, schema.path).unwrap_or_default(),
                name: name_html,
                content,
            });
        }

        info!(
            words = ?words,
            results = matches.len(),
            "Search complete"
        );

        Ok(matches)
    }
}

/// Search with the default engine.
pub fn search(snapshot: &Snapshot, input: &str) -> Result<Vec<QueryMatch>, SearchError> {
    QueryEngine::default().search(snapshot, input)
}

fn stored_text(doc: &TantivyDocument, field: Field) -> Option<String> {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
