//! Content tree builder.
//!
//! Walks a document directory recursively, renders every Markdown file and
//! emits one [`IndexDocument`] per directory and document on the way.

use std::collections::HashSet;
use std::fs::{self, FileType};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use markdump_types::{join_url, path_string, Directory, Document, Entry, IndexDocument};

use crate::render::{MarkdownRenderer, Renderer};
use crate::slug::{disambiguate, slugify};

/// File extensions recognized as Markdown documents (compared case-insensitively).
pub const MARKUP_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Error type for tree building.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        TreeError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of one build pass.
#[derive(Debug)]
pub struct BuildOutput {
    pub root: Directory,
    /// Index input for every directory and document in the tree
    pub documents: Vec<IndexDocument>,
}

/// Builder for the content tree.
pub struct TreeBuilder {
    renderer: Arc<dyn Renderer>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(Arc::new(MarkdownRenderer::new()))
    }
}

impl TreeBuilder {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }

    /// Build the tree rooted at `location`.
    ///
    /// Any read failure aborts the whole build.
    pub fn build(&self, location: &Path) -> Result<BuildOutput, TreeError> {
        let mut root = Directory::root(location);
        let mut documents = Vec::new();
        self.load(&mut root, &mut documents)?;

        info!(
            root = ?location,
            documents = root.document_count(),
            index_documents = documents.len(),
            "Built content tree"
        );

        Ok(BuildOutput { root, documents })
    }

    /// Load the children of `dir` from its backing location.
    fn load(&self, dir: &mut Directory, out: &mut Vec<IndexDocument>) -> Result<(), TreeError> {
        let ancestors = dir.child_ancestors();
        let ancestor_path = path_string(&ancestors);

        let mut children = Vec::new();
        let mut taken: HashSet<String> = HashSet::new();

        for (name, path, file_type) in read_sorted(dir.location())? {
            if name.starts_with('.') {
                continue;
            }

            // Symlinked directories are never descended into.
            if file_type.is_dir() {
                let title = name.trim();
                let Some(slug) = child_slug(title, &path, &taken) else {
                    continue;
                };

                let mut subdir = Directory::new(
                    title,
                    join_url(&dir.url, &slug),
                    slug.clone(),
                    path.clone(),
                    ancestors.clone(),
                );
                self.load(&mut subdir, out)?;

                if subdir.is_empty() {
                    debug!(path = ?path, "Skipping empty directory");
                    continue;
                }

                out.push(IndexDocument {
                    id: subdir.url.clone(),
                    path: ancestor_path.clone(),
                    name: subdir.title.clone(),
                    body: None,
                });
                taken.insert(slug);
                children.push(Entry::Directory(subdir));
            } else if is_markup(&path) && is_document_file(&path, &file_type) {
                let title = document_title(name.trim());
                let Some(slug) = child_slug(title, &path, &taken) else {
                    continue;
                };

                let bytes = fs::read(&path).map_err(|e| TreeError::io(&path, e))?;
                let source = String::from_utf8_lossy(&bytes).into_owned();

                let doc = Document {
                    title: title.to_string(),
                    url: join_url(&dir.url, &slug),
                    slug: slug.clone(),
                    html: self.renderer.render(&source),
                };

                debug!(url = %doc.url, bytes = bytes.len(), "Loaded document");

                out.push(IndexDocument {
                    id: doc.url.clone(),
                    path: ancestor_path.clone(),
                    name: doc.title.clone(),
                    body: Some(source),
                });
                taken.insert(slug);
                children.push(Entry::Document(doc));
            }
        }

        dir.set_children(children);
        Ok(())
    }
}

/// Directory listing sorted by file name, so slug suffixes are stable.
///
/// File types come from the listing itself and do not follow symlinks.
fn read_sorted(location: &Path) -> Result<Vec<(String, PathBuf, FileType)>, TreeError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(location).map_err(|e| TreeError::io(location, e))? {
        let entry = entry.map_err(|e| TreeError::io(location, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| TreeError::io(&path, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, path, file_type));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Regular file, or a symlink resolving to one. Dangling links are skipped.
fn is_document_file(path: &Path, file_type: &FileType) -> bool {
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }
    match fs::metadata(path) {
        Ok(target) => target.is_file(),
        Err(e) => {
            warn!(path = ?path, error = %e, "Skipping unreadable symlink");
            false
        }
    }
}

/// Slug for a new child, unique among the siblings seen so far.
fn child_slug(title: &str, path: &Path, taken: &HashSet<String>) -> Option<String> {
    let slug = slugify(title);
    if slug.is_empty() {
        warn!(path = ?path, "Skipping entry without addressable name");
        return None;
    }
    let unique = disambiguate(&slug, |s| taken.contains(s));
    if unique != slug {
        warn!(path = ?path, slug = %slug, renamed = %unique, "Slug collision");
    }
    Some(unique)
}

/// Whether the path carries one of the [`MARKUP_EXTENSIONS`].
pub fn is_markup(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MARKUP_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// File name without its extension.
fn document_title(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.trim_end(),
        _ => name,
    }
}
