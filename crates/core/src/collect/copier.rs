//! Recursive copy of a validated asset directory into the output registry.

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use satchel_api::{AssetFileSystem, FileKind, FileStatus, OutputAsset, OutputAssetRegistry};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::flow_control::FlowController;
use super::{AssetFailure, CopyStats};
use crate::config::{CollectorConfig, CollisionPolicy, SymlinkPolicy};
use crate::error::{CollectError, Result};
use crate::path::output_key;

/// The validated asset directory being copied
#[derive(Debug, Clone, Copy)]
pub struct AssetRoot<'a> {
    pub namespace: &'a str,
    pub dir: &'a Path,
}

/// Resolved identities of the directories from the asset root down to the
/// one being copied. A directory whose identity is already on the lineage is
/// a symlink cycle.
#[derive(Debug, Clone)]
struct Lineage(Vec<PathBuf>);

impl Lineage {
    fn root(identity: PathBuf) -> Self {
        Self(vec![identity])
    }

    /// Directory levels below the asset root (the root is 0)
    fn depth(&self) -> usize {
        self.0.len() - 1
    }

    fn contains(&self, identity: &Path) -> bool {
        self.0.iter().any(|seen| seen == identity)
    }

    fn child(&self, identity: PathBuf) -> Self {
        let mut dirs = self.0.clone();
        dirs.push(identity);
        Self(dirs)
    }
}

pub struct DirectoryCopier<'a> {
    fs: &'a dyn AssetFileSystem,
    registry: &'a dyn OutputAssetRegistry,
    flow: &'a FlowController,
    config: &'a CollectorConfig,
}

impl<'a> DirectoryCopier<'a> {
    pub fn new(
        fs: &'a dyn AssetFileSystem,
        registry: &'a dyn OutputAssetRegistry,
        flow: &'a FlowController,
        config: &'a CollectorConfig,
    ) -> Self {
        Self {
            fs,
            registry,
            flow,
            config,
        }
    }

    /// List the asset root and copy everything below it.
    pub async fn copy(&self, root: AssetRoot<'_>) -> CopyStats {
        let listed = self.list(root.dir).await;
        match listed {
            Ok(names) => self.copy_listed(root, names).await,
            Err(error) => failed(root, root.dir.to_path_buf(), error),
        }
    }

    /// Copy the asset root from its already-listed entry `names`.
    pub async fn copy_listed(&self, root: AssetRoot<'_>, names: Vec<OsString>) -> CopyStats {
        let identity = self.identity(root.dir).await;
        match identity {
            Ok(identity) => {
                let lineage = Lineage::root(identity);
                self.copy_entries(root.dir, names, root, &lineage).await
            }
            Err(error) => failed(root, root.dir.to_path_buf(), error),
        }
    }

    fn copy_dir<'s>(
        &'s self,
        dir: PathBuf,
        root: AssetRoot<'s>,
        lineage: Lineage,
    ) -> BoxFuture<'s, CopyStats> {
        async move {
            let listed = self.list(&dir).await;
            let names = match listed {
                Ok(names) => names,
                Err(error) => return failed(root, dir, error),
            };
            self.copy_entries(&dir, names, root, &lineage).await
        }
        .boxed()
    }

    /// Copy `names` of `dir`, all entries concurrently.
    async fn copy_entries(
        &self,
        dir: &Path,
        names: Vec<OsString>,
        root: AssetRoot<'_>,
        lineage: &Lineage,
    ) -> CopyStats {
        let tasks = names
            .into_iter()
            .map(|name| self.copy_entry(dir.join(name), root, lineage));

        join_all(tasks)
            .await
            .into_iter()
            .fold(CopyStats::default(), CopyStats::merge)
    }

    async fn copy_entry(&self, path: PathBuf, root: AssetRoot<'_>, lineage: &Lineage) -> CopyStats {
        let status = self.status(&path).await;
        let status = match status {
            Ok(status) => status,
            Err(error) => return failed(root, path, error),
        };

        match status.kind {
            FileKind::Directory => {
                let identity = self.identity(&path).await;
                let identity = match identity {
                    Ok(identity) => identity,
                    Err(error) => return failed(root, path, error),
                };
                if lineage.contains(&identity) {
                    warn!(
                        "Skipping {}: symlink cycle back to {}",
                        path.display(),
                        identity.display()
                    );
                    return CopyStats {
                        symlink_cycles: 1,
                        ..CopyStats::default()
                    };
                }
                if lineage.depth() >= self.config.max_depth {
                    let error = CollectError::DepthExceeded {
                        path: path.clone(),
                        limit: self.config.max_depth,
                    };
                    return failed(root, path, error);
                }
                self.copy_dir(path, root, lineage.child(identity)).await
            }
            FileKind::File => {
                let copied = self.copy_file(&path, status, root).await;
                copied.unwrap_or_else(|error| failed(root, path, error))
            }
            FileKind::Symlink => {
                debug!("Skipping symlink {}", path.display());
                CopyStats::default()
            }
            FileKind::Other => {
                warn!(
                    "Skipping {}: neither a regular file nor a directory",
                    path.display()
                );
                CopyStats::default()
            }
        }
    }

    async fn copy_file(
        &self,
        path: &Path,
        status: FileStatus,
        root: AssetRoot<'_>,
    ) -> Result<CopyStats> {
        let content = {
            let _permit = self.flow.acquire_in_flight().await?;
            self.fs
                .read_file(path)
                .await
                .map_err(|e| CollectError::io(path, e))?
        };

        let relative = path.strip_prefix(root.dir).unwrap_or(path);
        let key = output_key(&self.config.output_base, root.namespace, relative);
        let mut stats = CopyStats {
            assets: 1,
            bytes: content.len() as u64,
            ..CopyStats::default()
        };

        trace!("Emitting {} ({} bytes)", key, status.size);
        if self
            .registry
            .insert(key.clone(), OutputAsset::new(content, status.size))
            .is_some()
        {
            stats.collisions += 1;
            match self.config.collisions {
                CollisionPolicy::Overwrite => debug!("Replaced existing output asset {}", key),
                CollisionPolicy::Error => {
                    warn!("Output path collision at {} from {}", key, path.display());
                    let error = CollectError::Collision { key };
                    stats.record(AssetFailure::new(root.namespace, path.to_path_buf(), error));
                }
            }
        }

        Ok(stats)
    }

    async fn list(&self, dir: &Path) -> Result<Vec<OsString>> {
        let _permit = self.flow.acquire_in_flight().await?;
        self.fs
            .read_dir(dir)
            .await
            .map_err(|e| CollectError::io(dir, e))
    }

    async fn status(&self, path: &Path) -> Result<FileStatus> {
        let _permit = self.flow.acquire_in_flight().await?;
        let status = match self.config.symlinks {
            SymlinkPolicy::Follow => self.fs.stat(path).await,
            SymlinkPolicy::Skip => self.fs.symlink_stat(path).await,
        };
        status.map_err(|e| CollectError::io(path, e))
    }

    /// What a directory really is. Only followed links can form cycles, so
    /// under [`SymlinkPolicy::Skip`] the path itself is enough.
    async fn identity(&self, dir: &Path) -> Result<PathBuf> {
        match self.config.symlinks {
            SymlinkPolicy::Follow => {
                let _permit = self.flow.acquire_in_flight().await?;
                self.fs
                    .canonicalize(dir)
                    .await
                    .map_err(|e| CollectError::io(dir, e))
            }
            SymlinkPolicy::Skip => Ok(dir.to_path_buf()),
        }
    }
}

fn failed(root: AssetRoot<'_>, path: PathBuf, error: CollectError) -> CopyStats {
    warn!("Asset copy failed for {}: {}", path.display(), error);
    CopyStats::failed(AssetFailure::new(root.namespace, path, error))
}
