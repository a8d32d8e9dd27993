pub mod error;
pub mod logging;
pub mod path;

pub mod collect;
pub mod config;
pub mod fs;
pub mod registry;

pub use collect::{AssetCollector, AssetCollectorBuilder, AssetFailure, EmitReport};
pub use config::{CollectorConfig, CollisionPolicy, SymlinkPolicy};
pub use error::{CollectError, Result};
pub use registry::InMemoryAssetRegistry;
