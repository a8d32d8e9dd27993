use satchel_api::{BuildModule, OutputAssetRegistry};
use satchel_core::{AssetCollector, CollectorConfig, EmitReport, Result};

pub use satchel_core::logging::LogOptions;

/// Bootstraps a collector over the real filesystem.
pub fn build_default_collector(config: CollectorConfig) -> AssetCollector {
    AssetCollector::builder().with_config(config).build()
}

/// Initializes the logging system for a specific component.
/// This delegates to the core logging module; hosts that already installed a
/// subscriber get [`CollectError::Logging`](satchel_core::CollectError::Logging)
/// back and can keep their own.
pub fn init_logging(options: &LogOptions) -> Result<impl Drop> {
    satchel_core::logging::init_logging(options)
}

/// Emit-phase hook for build hosts.
///
/// Hosts construct it once from their plugin options and call
/// [`on_emit`](Self::on_emit) at every emit, resuming their own pipeline only
/// after it returns.
pub struct AssetPlugin {
    collector: AssetCollector,
}

impl AssetPlugin {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            collector: build_default_collector(config),
        }
    }

    /// Parse plugin options such as `{"outputBase": "build"}`.
    pub fn from_options_json(raw: &str) -> Result<Self> {
        Ok(Self::new(CollectorConfig::from_json_str(raw)?))
    }

    pub fn with_collector(collector: AssetCollector) -> Self {
        Self { collector }
    }

    pub fn collector(&self) -> &AssetCollector {
        &self.collector
    }

    pub async fn on_emit<M: BuildModule>(
        &self,
        modules: &[M],
        registry: &dyn OutputAssetRegistry,
    ) -> Result<EmitReport> {
        tracing::debug!("Emit hook invoked with {} modules", modules.len());
        self.collector.emit(modules, registry).await
    }
}

impl Default for AssetPlugin {
    fn default() -> Self {
        Self::new(CollectorConfig::default())
    }
}
