//! URL path resolution against the content tree.

use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use thiserror::Error;

use markdump_types::{Directory, Document};

use crate::error::ServiceError;

/// Paths with more segments are rejected before any lookup.
pub const MAX_SEGMENTS: usize = 16;

/// What a URL path points at.
#[derive(Debug)]
pub enum Route<'a> {
    Directory(&'a Directory),
    Document {
        dir: &'a Directory,
        doc: &'a Document,
    },
    /// Candidate file next to the documents of a directory. Not checked for
    /// existence.
    PassThrough(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("path too long")]
    PathTooLong,

    #[error("not found")]
    NotFound,
}

impl From<RouteError> for ServiceError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::PathTooLong => ServiceError::PathTooLong,
            RouteError::NotFound => ServiceError::NotFound,
        }
    }
}

/// Resolve `path` against the tree rooted at `root`.
///
/// Directory slugs are consumed while they match. The remainder decides the
/// route: nothing left is the directory itself, one segment is a document
/// or else a pass-through file, more is not found.
pub fn resolve<'a>(root: &'a Directory, path: &str) -> Result<Route<'a>, RouteError> {
    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if raw.len() > MAX_SEGMENTS {
        return Err(RouteError::PathTooLong);
    }

    let segments: Vec<String> = raw
        .iter()
        .map(|s| percent_decode_str(s).decode_utf8_lossy().trim().to_string())
        .collect();

    let mut dir = root;
    let mut rest = segments.as_slice();
    while let Some((first, tail)) = rest.split_first() {
        match dir.subdir(&first.to_lowercase()) {
            Some(subdir) => {
                dir = subdir;
                rest = tail;
            }
            None => break,
        }
    }

    match rest {
        [] => Ok(Route::Directory(dir)),
        [segment] => {
            if let Some(doc) = dir.document(&segment.to_lowercase()) {
                return Ok(Route::Document { dir, doc });
            }
            if !is_plain_file_name(segment) {
                return Err(RouteError::NotFound);
            }
            Ok(Route::PassThrough(dir.location().join(segment)))
        }
        _ => Err(RouteError::NotFound),
    }
}

/// A single, visible path component.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}
