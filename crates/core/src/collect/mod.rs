//! Companion asset collection, run once per build emit.
//!
//! The inspector finds each module's asset directory and checks it for a core
//! file; the copier walks validated directories into the output registry. All
//! filesystem calls pass through one [`FlowController`].

pub mod copier;
pub mod flow_control;
pub mod inspector;
pub mod namespace;

use satchel_api::{AssetFileSystem, BuildModule, OutputAssetRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::config::CollectorConfig;
use crate::error::{CollectError, Result};
use crate::fs::TokioFileSystem;
pub use copier::{AssetRoot, DirectoryCopier};
pub use flow_control::{FlowControlConfig, FlowController};
pub use inspector::{ModuleInspector, ModuleOutcome};
pub use namespace::{AssetLocation, is_valid_namespace};

/// A failure tied to one path of one module's asset tree
#[derive(Debug)]
pub struct AssetFailure {
    pub namespace: String,
    pub path: PathBuf,
    pub error: CollectError,
}

impl AssetFailure {
    pub fn new(namespace: &str, path: PathBuf, error: CollectError) -> Self {
        Self {
            namespace: namespace.to_string(),
            path,
            error,
        }
    }
}

/// Counters for one copied subtree
#[derive(Debug, Default)]
pub struct CopyStats {
    pub assets: usize,
    pub bytes: u64,
    /// Writes that replaced an existing output path
    pub collisions: usize,
    /// Directory links that led back to a directory already being copied
    pub symlink_cycles: usize,
    pub failures: Vec<AssetFailure>,
}

impl CopyStats {
    pub fn failed(failure: AssetFailure) -> Self {
        Self {
            failures: vec![failure],
            ..Self::default()
        }
    }

    pub fn record(&mut self, failure: AssetFailure) {
        self.failures.push(failure);
    }

    pub fn merge(mut self, other: CopyStats) -> Self {
        self.assets += other.assets;
        self.bytes += other.bytes;
        self.collisions += other.collisions;
        self.symlink_cycles += other.symlink_cycles;
        self.failures.extend(other.failures);
        self
    }
}

/// Result of one emit
#[derive(Debug, Default)]
pub struct EmitReport {
    /// Modules handed in by the host
    pub modules_total: usize,
    /// Modules with no asset directory, or one without a core file
    pub modules_skipped: usize,
    /// Modules whose asset directory was copied (possibly partially)
    pub modules_copied: usize,
    /// Modules whose asset directory exists but could not be listed
    pub modules_failed: usize,
    /// Number of assets written to the registry
    pub assets_emitted: usize,
    /// Bytes read for emitted assets
    pub bytes_emitted: u64,
    pub collisions: usize,
    /// Symlink cycles that were skipped, see [`CopyStats::symlink_cycles`]
    pub symlink_cycles: usize,
    pub failures: Vec<AssetFailure>,
    pub duration: Duration,
}

impl EmitReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Err(CollectError::Incomplete)` if any failure was recorded
    pub fn into_result(self) -> Result<EmitReport> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(CollectError::Incomplete {
                report: Box::new(self),
            })
        }
    }

    fn absorb(&mut self, outcome: ModuleOutcome) {
        match outcome {
            ModuleOutcome::Skipped => self.modules_skipped += 1,
            ModuleOutcome::Failed(failure) => {
                self.modules_failed += 1;
                self.failures.push(failure);
            }
            ModuleOutcome::Copied(stats) => {
                self.modules_copied += 1;
                self.assets_emitted += stats.assets;
                self.bytes_emitted += stats.bytes;
                self.collisions += stats.collisions;
                self.symlink_cycles += stats.symlink_cycles;
                self.failures.extend(stats.failures);
            }
        }
    }
}

/// Entry point the host calls once per emit
pub struct AssetCollector {
    fs: Arc<dyn AssetFileSystem>,
    config: CollectorConfig,
    flow: FlowController,
}

impl AssetCollector {
    pub fn new(fs: Arc<dyn AssetFileSystem>, config: CollectorConfig) -> Self {
        let flow = FlowController::new(&FlowControlConfig::from(&config));
        Self { fs, config, flow }
    }

    pub fn builder() -> AssetCollectorBuilder {
        AssetCollectorBuilder::new()
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Copy the companion assets of `modules` into `registry`.
    ///
    /// Never fails as a whole: every problem is recorded in
    /// [`EmitReport::failures`] and the remaining modules still run.
    pub async fn collect<M: BuildModule>(
        &self,
        modules: &[M],
        registry: &dyn OutputAssetRegistry,
    ) -> EmitReport {
        let start = Instant::now();
        let inspector = ModuleInspector::new(self.fs.as_ref(), registry, &self.flow, &self.config);
        let mut report = inspector.inspect(modules).await;
        report.duration = start.elapsed();

        info!(
            "Asset collection complete: {} modules, {} copied, {} assets ({} bytes), {} symlink cycles skipped, {} failures in {:?}",
            report.modules_total,
            report.modules_copied,
            report.assets_emitted,
            report.bytes_emitted,
            report.symlink_cycles,
            report.failures.len(),
            report.duration
        );
        report
    }

    /// Like [`collect`](Self::collect), but fails if anything went wrong.
    pub async fn emit<M: BuildModule>(
        &self,
        modules: &[M],
        registry: &dyn OutputAssetRegistry,
    ) -> Result<EmitReport> {
        self.collect(modules, registry).await.into_result().inspect_err(|e| {
            error!("Asset collection error: {}", e);
        })
    }
}

/// Builder for AssetCollector
pub struct AssetCollectorBuilder {
    fs: Option<Arc<dyn AssetFileSystem>>,
    config: CollectorConfig,
}

impl AssetCollectorBuilder {
    pub fn new() -> Self {
        Self {
            fs: None,
            config: CollectorConfig::default(),
        }
    }

    pub fn with_file_system(mut self, fs: Arc<dyn AssetFileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn with_config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_output_base(mut self, output_base: impl Into<String>) -> Self {
        self.config.output_base = output_base.into();
        self
    }

    /// Defaults to the real filesystem
    pub fn build(self) -> AssetCollector {
        let fs = self.fs.unwrap_or_else(|| Arc::new(TokioFileSystem::new()));
        AssetCollector::new(fs, self.config)
    }
}

impl Default for AssetCollectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
