//! Output asset record and the registry the collector writes into.

use std::sync::Arc;

/// An emitted asset: the bytes read from disk plus the size reported by the
/// status query taken before the read.
///
/// `size` and `source().len()` agree unless the file changed between the
/// two calls; the collector does not reconcile them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAsset {
    content: Arc<[u8]>,
    size: u64,
}

impl OutputAsset {
    pub fn new(content: impl Into<Arc<[u8]>>, size: u64) -> Self {
        Self {
            content: content.into(),
            size,
        }
    }

    /// Asset built from in-memory bytes, sized by their length
    pub fn from_bytes(content: impl Into<Arc<[u8]>>) -> Self {
        let content = content.into();
        let size = content.len() as u64;
        Self { content, size }
    }

    pub fn source(&self) -> &[u8] {
        &self.content
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Host map from output path to emitted asset.
///
/// The collector only inserts. Writing an existing path replaces the old
/// record and hands it back, like `HashMap::insert`.
pub trait OutputAssetRegistry: Send + Sync {
    fn insert(&self, path: String, asset: OutputAsset) -> Option<OutputAsset>;
}

impl<T: OutputAssetRegistry + ?Sized> OutputAssetRegistry for Arc<T> {
    fn insert(&self, path: String, asset: OutputAsset) -> Option<OutputAsset> {
        (**self).insert(path, asset)
    }
}
