//! Snapshot construction.
//!
//! Every reload builds a fresh in-RAM index from all index documents in one
//! batch and keeps only a point-in-time searcher over it. There is no
//! incremental update path.

use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher};
use tracing::{debug, info};

use markdump_types::IndexDocument;

use crate::document::index_document_to_doc;
use crate::error::SearchError;
use crate::schema::{build_search_schema, SearchSchema};

/// Default memory budget for IndexWriter (50MB)
const DEFAULT_WRITER_MEMORY_MB: usize = 50;

/// Snapshot build configuration
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Memory budget for writer in MB
    pub writer_memory_mb: usize,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            writer_memory_mb: DEFAULT_WRITER_MEMORY_MB,
        }
    }
}

/// Immutable, point-in-time view of one built index.
///
/// Cheap to share behind an `Arc`; any number of queries may run against it
/// concurrently.
#[derive(Clone)]
pub struct Snapshot {
    searcher: Searcher,
    schema: SearchSchema,
}

impl Snapshot {
    /// Get the search schema
    pub fn schema(&self) -> &SearchSchema {
        &self.schema
    }

    /// Get the underlying Tantivy searcher
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    /// Number of indexed documents.
    pub fn num_docs(&self) -> u64 {
        self.searcher.num_docs()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("num_docs", &self.num_docs())
            .finish()
    }
}

/// Build a snapshot with the default configuration.
pub fn build_index(documents: &[IndexDocument]) -> Result<Snapshot, SearchError> {
    build_index_with_config(documents, &SearchIndexConfig::default())
}

/// Build a snapshot over `documents` in a single batched write.
pub fn build_index_with_config(
    documents: &[IndexDocument],
    config: &SearchIndexConfig,
) -> Result<Snapshot, SearchError> {
    let schema = build_search_schema();
    let index = Index::create_in_ram(schema.schema().clone());

    let memory_budget = config.writer_memory_mb * 1024 * 1024;
    let mut writer: IndexWriter = index.writer(memory_budget)?;
    debug!(memory_mb = config.writer_memory_mb, "Created index writer");

    for input in documents {
        writer.add_document(index_document_to_doc(&schema, input))?;
    }
    let opstamp = writer.commit()?;

    let reader: IndexReader = index
        .reader_builder()
        .reload_policy(ReloadPolicy::Manual)
        .try_into()?;
    let searcher = reader.searcher();

    info!(
        opstamp,
        documents = documents.len(),
        segments = searcher.segment_readers().len(),
        "Built search snapshot"
    );

    Ok(Snapshot { searcher, schema })
}
