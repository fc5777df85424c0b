//! Published site state and the reload coordinator.
//!
//! Requests read the current [`Published`] pair through a cheap `Arc` clone.
//! A reload builds the next pair off to the side and swaps it in under a
//! short write lock; requests still holding the old pair finish on it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{error, info};

use markdump_search::{
    build_index_with_config, QueryEngine, QueryMatch, SearchError, SearchIndexConfig, Snapshot,
};
use markdump_tree::TreeBuilder;
use markdump_types::Directory;

use crate::error::ReloadError;

/// One consistent tree and snapshot, built together.
#[derive(Debug)]
pub struct Published {
    /// Starts at 1 and grows by one per successful reload
    pub version: u64,
    pub root: Directory,
    pub snapshot: Snapshot,
}

/// Shared state of a running site.
pub struct SiteState {
    location: PathBuf,
    builder: TreeBuilder,
    index_config: SearchIndexConfig,
    engine: QueryEngine,
    current: RwLock<Arc<Published>>,
    /// Held for the whole build + swap
    reload_lock: Mutex<()>,
}

impl SiteState {
    /// Build the initial pair from `location` with default settings.
    pub fn load(location: impl Into<PathBuf>) -> Result<Self, ReloadError> {
        Self::with_builder(location, TreeBuilder::default(), SearchIndexConfig::default())
    }

    pub fn with_builder(
        location: impl Into<PathBuf>,
        builder: TreeBuilder,
        index_config: SearchIndexConfig,
    ) -> Result<Self, ReloadError> {
        let location = location.into();
        let (root, snapshot) = build_pair(&builder, &index_config, &location)?;

        info!(location = ?location, documents = snapshot.num_docs(), "Published version 1");

        Ok(Self {
            location,
            builder,
            index_config,
            engine: QueryEngine::default(),
            current: RwLock::new(Arc::new(Published {
                version: 1,
                root,
                snapshot,
            })),
            reload_lock: Mutex::new(()),
        })
    }

    /// The pair requests should use.
    pub fn current(&self) -> Arc<Published> {
        self.current.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Rebuild tree and snapshot and publish them.
    ///
    /// Reloads run one at a time. On failure the current pair stays
    /// published and the error is returned.
    pub fn reload(&self) -> Result<u64, ReloadError> {
        let _guard = self.reload_lock.lock();

        let built = build_pair(&self.builder, &self.index_config, &self.location);
        let (root, snapshot) = match built {
            Ok(pair) => pair,
            Err(e) => {
                error!(
                    location = ?self.location,
                    version = self.version(),
                    error = %e,
                    "Reload failed, keeping current version"
                );
                return Err(e);
            }
        };

        let documents = snapshot.num_docs();
        let version = {
            let mut current = self.current.write();
            let version = current.version + 1;
            *current = Arc::new(Published {
                version,
                root,
                snapshot,
            });
            version
        };

        info!(version, documents, "Published new version");
        Ok(version)
    }

    /// Run `input` against the current snapshot.
    pub fn search(&self, input: &str) -> Result<Vec<QueryMatch>, SearchError> {
        let published = self.current();
        self.engine.search(&published.snapshot, input)
    }
}

impl std::fmt::Debug for SiteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteState")
            .field("location", &self.location)
            .field("version", &self.version())
            .finish()
    }
}

/// Reload on the blocking pool.
pub async fn reload_in_background(state: Arc<SiteState>) -> Result<u64, ReloadError> {
    tokio::task::spawn_blocking(move || state.reload())
        .await
        .map_err(|e| ReloadError::Join(e.to_string()))?
}

fn build_pair(
    builder: &TreeBuilder,
    index_config: &SearchIndexConfig,
    location: &Path,
) -> Result<(Directory, Snapshot), ReloadError> {
    let output = builder.build(location)?;
    let snapshot = build_index_with_config(&output.documents, index_config)?;
    Ok((output.root, snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, SiteState) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("fox.md"), "The quick brown fox").unwrap();
        let state = SiteState::load(temp.path()).unwrap();
        (temp, state)
    }

    #[test]
    fn test_initial_version() {
        let (_temp, state) = site();
        assert_eq!(state.version(), 1);
        assert!(state.current().root.document("fox").is_some());
        assert_eq!(state.current().snapshot.num_docs(), 1);
    }

    #[test]
    fn test_reload_publishes_new_pair() {
        let (temp, state) = site();
        let before = state.current();

        fs::write(temp.path().join("dog.md"), "A lazy dog").unwrap();
        assert_eq!(state.reload().unwrap(), 2);

        let after = state.current();
        assert!(after.root.document("dog").is_some());
        assert_eq!(state.search("lazy").unwrap().len(), 1);

        // Readers holding the old pair are unaffected
        assert!(before.root.document("dog").is_none());
        assert_eq!(before.version, 1);
    }

    #[test]
    fn test_failed_reload_keeps_current() {
        let (temp, state) = site();
        let location = temp.path().to_path_buf();
        drop(temp);

        let err = state.reload().unwrap_err();
        assert!(matches!(err, ReloadError::Tree(_)));
        assert_eq!(state.version(), 1);
        assert_eq!(state.search("quick").unwrap().len(), 1);
        assert!(!location.exists());
    }

    #[test]
    fn test_concurrent_reloads_are_serialized() {
        let (_temp, state) = site();
        let state = Arc::new(state);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || state.reload().unwrap())
            })
            .collect();

        let mut versions: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        versions.sort();
        assert_eq!(versions, vec![2, 3, 4, 5]);
        assert_eq!(state.version(), 5);
    }

    #[tokio::test]
    async fn test_reload_in_background() {
        let (_temp, state) = site();
        let state = Arc::new(state);
        let version = reload_in_background(state.clone()).await.unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn test_missing_location_fails_load() {
        let temp = TempDir::new().unwrap();
        let result = SiteState::load(temp.path().join("missing"));
        assert!(matches!(result, Err(ReloadError::Tree(_))));
    }
}
