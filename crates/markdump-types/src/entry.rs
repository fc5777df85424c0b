//! Content tree types.
//!
//! The tree is a hierarchy of directories and documents:
//! Home -> Directory -> ... -> Document
//!
//! A tree is built once per reload and never mutated afterwards. Each
//! directory owns its children; breadcrumbs are stored as plain copies of
//! the ancestors' titles and URLs, so there are no back-pointers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Title of the root directory.
pub const ROOT_TITLE: &str = "Home";

/// URL of the root directory.
pub const ROOT_URL: &str = "/";

/// Separator used between ancestor titles in the path string.
pub const PATH_SEPARATOR: &str = " / ";

/// Snapshot of an ancestor directory, used for breadcrumbs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub title: String,
    pub url: String,
}

/// Join a parent URL and a child slug.
///
/// The root URL is "/", so its children are "/slug" rather than "//slug".
pub fn join_url(parent: &str, slug: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, slug)
    } else {
        format!("{}/{}", parent, slug)
    }
}

/// Human-readable ancestor string: every title followed by " / ".
pub fn path_string(crumbs: &[Crumb]) -> String {
    let mut out = String::new();
    for crumb in crumbs {
        out.push_str(&crumb.title);
        out.push_str(PATH_SEPARATOR);
    }
    out
}

/// A node in the content tree.
#[derive(Debug, Clone)]
pub enum Entry {
    Directory(Directory),
    Document(Document),
}

impl Entry {
    pub fn title(&self) -> &str {
        match self {
            Entry::Directory(dir) => &dir.title,
            Entry::Document(doc) => &doc.title,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Entry::Directory(dir) => &dir.url,
            Entry::Document(doc) => &doc.url,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Entry::Directory(dir) => &dir.slug,
            Entry::Document(doc) => &doc.slug,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }
}

/// A directory with at least one document somewhere below it.
#[derive(Debug, Clone)]
pub struct Directory {
    pub title: String,
    pub url: String,
    pub slug: String,
    /// Backing filesystem location (used for pass-through files)
    pub location: PathBuf,
    /// Ancestors from the root down to the parent; empty for the root
    pub ancestors: Vec<Crumb>,
    children: Vec<Entry>,
    lookup: HashMap<String, usize>,
}

impl Directory {
    /// Create a directory without children.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        slug: impl Into<String>,
        location: impl Into<PathBuf>,
        ancestors: Vec<Crumb>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            slug: slug.into(),
            location: location.into(),
            ancestors,
            children: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Create the root directory for a document store.
    pub fn root(location: impl Into<PathBuf>) -> Self {
        Self::new(ROOT_TITLE, ROOT_URL, "", location, Vec::new())
    }

    /// Replace the children. They are sorted by URL and indexed by slug.
    pub fn set_children(&mut self, mut children: Vec<Entry>) {
        children.sort_by(|a, b| a.url().cmp(b.url()));
        self.lookup = children
            .iter()
            .enumerate()
            .map(|(i, child)| (child.slug().to_string(), i))
            .collect();
        self.children = children;
    }

    /// Children ordered by URL, directories and documents interleaved.
    pub fn children(&self) -> &[Entry] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Entry> {
        self.lookup.get(slug).map(|&i| &self.children[i])
    }

    pub fn subdir(&self, slug: &str) -> Option<&Directory> {
        match self.get(slug) {
            Some(Entry::Directory(dir)) => Some(dir),
            _ => None,
        }
    }

    pub fn document(&self, slug: &str) -> Option<&Document> {
        match self.get(slug) {
            Some(Entry::Document(doc)) => Some(doc),
            _ => None,
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// This directory as a breadcrumb.
    pub fn crumb(&self) -> Crumb {
        Crumb {
            title: self.title.clone(),
            url: self.url.clone(),
        }
    }

    /// Ancestor chain plus this directory, for its children.
    pub fn child_ancestors(&self) -> Vec<Crumb> {
        let mut crumbs = self.ancestors.clone();
        crumbs.push(self.crumb());
        crumbs
    }

    /// Number of documents in this subtree.
    pub fn document_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Entry::Directory(dir) => dir.document_count(),
                Entry::Document(_) => 1,
            })
            .sum()
    }
}

/// A rendered Markdown document.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name without the markup extension
    pub title: String,
    pub url: String,
    pub slug: String,
    /// Rendered HTML body
    pub html: String,
}

/// Search index input, one per directory and document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDocument {
    /// Canonical URL
    pub id: String,
    /// Ancestor titles, see [`path_string`]
    pub path: String,
    /// Display name
    pub name: String,
    /// Raw Markdown source; None for directories
    pub body: Option<String>,
}
