//! Per-module discovery of companion asset directories.

use futures::future::join_all;
use satchel_api::{AssetFileSystem, BuildModule, OutputAssetRegistry};
use std::ffi::OsString;
use std::io;
use tracing::{debug, trace, warn};

use super::copier::{AssetRoot, DirectoryCopier};
use super::flow_control::FlowController;
use super::namespace::{AssetLocation, is_valid_namespace};
use super::{AssetFailure, CopyStats, EmitReport};
use crate::config::CollectorConfig;
use crate::error::CollectError;

/// What happened to a single module
#[derive(Debug)]
pub enum ModuleOutcome {
    /// No resource path, no asset directory, or no core file
    Skipped,
    /// The asset directory exists but could not be listed
    Failed(AssetFailure),
    Copied(CopyStats),
}

pub struct ModuleInspector<'a> {
    fs: &'a dyn AssetFileSystem,
    flow: &'a FlowController,
    copier: DirectoryCopier<'a>,
}

impl<'a> ModuleInspector<'a> {
    pub fn new(
        fs: &'a dyn AssetFileSystem,
        registry: &'a dyn OutputAssetRegistry,
        flow: &'a FlowController,
        config: &'a CollectorConfig,
    ) -> Self {
        Self {
            fs,
            flow,
            copier: DirectoryCopier::new(fs, registry, flow, config),
        }
    }

    /// Inspect every module concurrently and fold the outcomes.
    ///
    /// Resolves only once every module and every nested copy has settled.
    pub async fn inspect<M: BuildModule>(&self, modules: &[M]) -> EmitReport {
        let outcomes = join_all(modules.iter().map(|m| self.inspect_module(m))).await;

        let mut report = EmitReport {
            modules_total: modules.len(),
            ..EmitReport::default()
        };
        for outcome in outcomes {
            report.absorb(outcome);
        }
        report
    }

    pub async fn inspect_module<M: BuildModule + ?Sized>(&self, module: &M) -> ModuleOutcome {
        let Some(location) = module.resource().and_then(AssetLocation::for_resource) else {
            trace!("Skipping module without a usable resource path");
            return ModuleOutcome::Skipped;
        };

        let names = match self.list_asset_dir(&location).await {
            Ok(Some(names)) => names,
            Ok(None) => return ModuleOutcome::Skipped,
            Err(error) => {
                warn!(
                    "Cannot list asset directory {}: {}",
                    location.dir.display(),
                    error
                );
                return ModuleOutcome::Failed(AssetFailure::new(
                    &location.namespace,
                    location.dir.clone(),
                    error,
                ));
            }
        };

        if !is_valid_namespace(&names, &location.namespace) {
            debug!(
                "{} has no entry prefixed by '{}', skipping",
                location.dir.display(),
                location.namespace
            );
            return ModuleOutcome::Skipped;
        }

        debug!(
            "Copying {} as namespace '{}'",
            location.dir.display(),
            location.namespace
        );
        let root = AssetRoot {
            namespace: &location.namespace,
            dir: &location.dir,
        };
        let stats = self.copier.copy_listed(root, names).await;
        ModuleOutcome::Copied(stats)
    }

    /// `Ok(None)` when there is no asset directory to look at
    async fn list_asset_dir(
        &self,
        location: &AssetLocation,
    ) -> Result<Option<Vec<OsString>>, CollectError> {
        let _permit = self.flow.acquire_in_flight().await?;
        match self.fs.read_dir(&location.dir).await {
            Ok(names) => Ok(Some(names)),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                trace!("No asset directory at {}", location.dir.display());
                Ok(None)
            }
            Err(e) => Err(CollectError::io(&location.dir, e)),
        }
    }
}
