use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A module resolved by the host during the current build pass.
///
/// Only the resource path is consulted. Handles are valid for one emit cycle
/// and are never mutated by the collector.
pub trait BuildModule: Send + Sync {
    /// Path of the file backing this module, if the module has one.
    ///
    /// Virtual and generated modules usually have no resource and return `None`.
    fn resource(&self) -> Option<&Path>;
}

/// Plain module handle for hosts that do not carry their own module type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModule {
    pub resource: Option<PathBuf>,
}

impl ResolvedModule {
    pub fn new(resource: impl Into<PathBuf>) -> Self {
        Self {
            resource: Some(resource.into()),
        }
    }

    /// A module without a backing file.
    pub fn virtual_module() -> Self {
        Self { resource: None }
    }
}

impl BuildModule for ResolvedModule {
    fn resource(&self) -> Option<&Path> {
        self.resource.as_deref()
    }
}

impl<T: BuildModule + ?Sized> BuildModule for &T {
    fn resource(&self) -> Option<&Path> {
        (**self).resource()
    }
}

impl<T: BuildModule + ?Sized> BuildModule for std::sync::Arc<T> {
    fn resource(&self) -> Option<&Path> {
        (**self).resource()
    }
}
