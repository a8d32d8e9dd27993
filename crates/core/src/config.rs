//! Collector configuration.
//!
//! Hosts usually build a [`CollectorConfig`] in code, but the type also
//! deserializes from the plugin-style option object:
//!
//! ```json
//! { "outputBase": "build", "maxInFlight": 32, "symlinks": "skip" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How directory entries that are symbolic links are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Classify by the link target; dangling links are reported as failures
    #[default]
    Follow,
    /// Ignore links entirely
    Skip,
}

/// What happens when an output path is written twice in one emit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Last write wins
    #[default]
    Overwrite,
    /// Last write still lands, but a collision failure is reported
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectorConfig {
    /// Prefix placed ahead of the namespace segment of every output path
    pub output_base: String,
    /// Upper bound on simultaneous filesystem operations
    pub max_in_flight: usize,
    /// Deepest directory level below an asset root that is still walked
    pub max_depth: usize,
    pub symlinks: SymlinkPolicy,
    pub collisions: CollisionPolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            output_base: String::new(),
            max_in_flight: 64,
            max_depth: 64,
            symlinks: SymlinkPolicy::default(),
            collisions: CollisionPolicy::default(),
        }
    }
}

impl CollectorConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_output_base(mut self, output_base: impl Into<String>) -> Self {
        self.output_base = output_base.into();
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    pub fn with_collisions(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::default();
        assert_eq!(config.output_base, "");
        assert_eq!(config.max_in_flight, 64);
        assert_eq!(config.symlinks, SymlinkPolicy::Follow);
        assert_eq!(config.collisions, CollisionPolicy::Overwrite);
    }

    #[test]
    fn test_from_partial_json() {
        let config = CollectorConfig::from_json_str(r#"{ "outputBase": "build" }"#).unwrap();
        assert_eq!(config.output_base, "build");
        assert_eq!(config.max_depth, 64);

        let config =
            CollectorConfig::from_json_str(r#"{ "symlinks": "skip", "collisions": "error" }"#)
                .unwrap();
        assert_eq!(config.symlinks, SymlinkPolicy::Skip);
        assert_eq!(config.collisions, CollisionPolicy::Error);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = CollectorConfig::from_json_str(r#"{ "symlinks": "sometimes" }"#).unwrap_err();
        assert!(matches!(err, crate::error::CollectError::Config(_)));
    }
}
