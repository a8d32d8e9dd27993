//! Namespace derivation and the core-file check.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Where a module's companion assets are expected to live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    /// Resource file name without its extension
    pub namespace: String,
    /// Sibling directory of the resource, named after the namespace
    pub dir: PathBuf,
}

impl AssetLocation {
    /// `app/my-app.js` -> namespace `my-app`, directory `app/my-app`.
    ///
    /// Returns `None` for paths without a usable file stem, including stems
    /// that are not valid UTF-8.
    pub fn for_resource(resource: &Path) -> Option<Self> {
        let namespace = resource.file_stem()?.to_str()?;
        if namespace.is_empty() {
            return None;
        }
        let parent = resource.parent().unwrap_or_else(|| Path::new(""));
        Some(Self {
            namespace: namespace.to_string(),
            dir: parent.join(namespace),
        })
    }
}

/// True iff some entry name starts with `namespace` (literal, case-sensitive).
///
/// Only the immediate entries of an asset directory are checked; nested
/// entries never need to match. Names need not be valid UTF-8.
pub fn is_valid_namespace<S: AsRef<OsStr>>(entry_names: &[S], namespace: &str) -> bool {
    !namespace.is_empty()
        && entry_names.iter().any(|name| {
            name.as_ref()
                .as_encoded_bytes()
                .starts_with(namespace.as_bytes())
        })
}
