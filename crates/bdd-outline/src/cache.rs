//! Parsed documents shared by absolute path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use log::debug;

use crate::config;
use crate::error::ParseError;
use crate::model::Feature;
use crate::parser::parse_feature;

/// Cache of parsed features keyed by absolute path.
///
/// Parsing happens outside the lock, so two threads asking for the same
/// uncached document may both parse it. The first tree inserted is kept and
/// returned to both, so callers never hold diverging copies. Caching is
/// skipped entirely while [`config::cache_features`] is off.
#[derive(Debug, Default)]
pub struct FeatureCache {
    features: Mutex<HashMap<PathBuf, Arc<Feature>>>,
}

impl FeatureCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached feature for `filename` under `base_dir`, parsing
    /// it on first use.
    ///
    /// # Errors
    /// Returns the [`ParseError`] of [`parse_feature`]; failures are not
    /// cached.
    pub fn get_or_parse(
        &self,
        base_dir: impl AsRef<Path>,
        filename: impl AsRef<Path>,
    ) -> Result<Arc<Feature>, ParseError> {
        let base_dir = base_dir.as_ref();
        let filename = filename.as_ref();
        let joined = base_dir.join(filename);
        let path = std::path::absolute(&joined).map_err(|source| ParseError::Io {
            path: joined.clone(),
            source,
        })?;
        let enabled = config::cache_features();
        if enabled {
            if let Some(feature) = self.lock().get(&path) {
                debug!("feature cache hit for {}", path.display());
                return Ok(Arc::clone(feature));
            }
        }
        let feature = Arc::new(parse_feature(base_dir, filename)?);
        if !enabled {
            return Ok(feature);
        }
        Ok(Arc::clone(self.lock().entry(path).or_insert(feature)))
    }

    /// Number of cached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget every cached document.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<Feature>>> {
        self.features.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

static GLOBAL: LazyLock<FeatureCache> = LazyLock::new(FeatureCache::new);

/// The process-wide feature cache.
#[must_use]
pub fn feature_cache() -> &'static FeatureCache {
    &GLOBAL
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests write and parse known files")]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serial_test::serial;
    use tempfile::TempDir;

    #[fixture]
    fn feature_dir() -> TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            dir.path().join("cart.feature"),
            "Feature: Cart\n  Scenario: Add\n    Given an empty cart\n",
        )
        .expect("write feature");
        dir
    }

    #[rstest]
    #[serial]
    fn repeated_lookups_share_one_tree(feature_dir: TempDir) {
        config::clear_cache_features_override();
        config::set_cache_features(true);
        let cache = FeatureCache::new();
        let first = cache
            .get_or_parse(feature_dir.path(), "cart.feature")
            .expect("feature parses");
        let second = cache
            .get_or_parse(feature_dir.path(), "cart.feature")
            .expect("feature parses");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        config::clear_cache_features_override();
    }

    #[rstest]
    #[serial]
    fn concurrent_first_lookups_agree_on_one_tree(feature_dir: TempDir) {
        config::set_cache_features(true);
        let cache = FeatureCache::new();
        let barrier = std::sync::Barrier::new(4);
        let trees: Vec<Arc<Feature>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache
                            .get_or_parse(feature_dir.path(), "cart.feature")
                            .expect("feature parses")
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("lookup thread completes"))
                .collect()
        });
        let kept = cache
            .get_or_parse(feature_dir.path(), "cart.feature")
            .expect("feature parses");
        assert!(trees.iter().all(|tree| Arc::ptr_eq(tree, &kept)));
        assert_eq!(cache.len(), 1);
        config::clear_cache_features_override();
    }

    #[rstest]
    #[serial]
    fn disabled_cache_parses_every_time(feature_dir: TempDir) {
        config::set_cache_features(false);
        let cache = FeatureCache::new();
        let first = cache
            .get_or_parse(feature_dir.path(), "cart.feature")
            .expect("feature parses");
        let second = cache
            .get_or_parse(feature_dir.path(), "cart.feature")
            .expect("feature parses");
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());
        config::clear_cache_features_override();
    }

    #[rstest]
    #[serial]
    fn parse_failures_are_not_cached(feature_dir: TempDir) {
        config::set_cache_features(true);
        let cache = FeatureCache::new();
        let err = cache
            .get_or_parse(feature_dir.path(), "missing.feature")
            .expect_err("file does not exist");
        assert!(matches!(err, ParseError::Io { .. }));
        assert!(cache.is_empty());
        config::clear_cache_features_override();
    }
}
