//! In-memory implementation of OutputAssetRegistry.
//!
//! Provides thread-safe storage for output path → OutputAsset mappings.

use dashmap::DashMap;
use satchel_api::{OutputAsset, OutputAssetRegistry};
use std::collections::BTreeMap;

/// Thread-safe in-memory asset registry
#[derive(Default)]
pub struct InMemoryAssetRegistry {
    assets: DashMap<String, OutputAsset>,
}

impl InMemoryAssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            assets: DashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, path: &str) -> Option<OutputAsset> {
        self.assets.get(path).map(|a| a.value().clone())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.assets.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// All registered output paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.assets.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Ordered copy of the registry contents
    pub fn snapshot(&self) -> BTreeMap<String, OutputAsset> {
        self.assets
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Total bytes of registered content
    pub fn total_bytes(&self) -> u64 {
        self.assets.iter().map(|e| e.value().source().len() as u64).sum()
    }
}

impl OutputAssetRegistry for InMemoryAssetRegistry {
    fn insert(&self, path: String, asset: OutputAsset) -> Option<OutputAsset> {
        self.assets.insert(path, asset)
    }
}
