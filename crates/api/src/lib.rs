//! Host-facing contracts for the Satchel asset collector.
//!
//! A build host hands the collector three things on every emit:
//! - the resolved [`BuildModule`]s of the current pass
//! - an [`OutputAssetRegistry`] to write emitted assets into
//! - an [`AssetFileSystem`] capability to read companion files through
//!
//! Nothing in this crate performs IO on its own.

pub mod asset;
pub mod fs;
pub mod module;

// Re-export commonly used types
pub use asset::{OutputAsset, OutputAssetRegistry};
pub use fs::{AssetFileSystem, FileKind, FileStatus};
pub use module::{BuildModule, ResolvedModule};
