use std::path::PathBuf;
use thiserror::Error;

use crate::collect::EmitReport;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory nesting under {} exceeds the limit of {limit}", path.display())]
    DepthExceeded { path: PathBuf, limit: usize },
    #[error("Output path collision: {key}")]
    Collision { key: String },
    #[error("Flow control error: {0}")]
    FlowControl(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logging setup failed: {0}")]
    Logging(String),
    #[error("Asset collection finished with {} failure(s)", report.failures.len())]
    Incomplete { report: Box<EmitReport> },
}

impl CollectError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CollectError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for CollectError {
    fn from(err: serde_json::Error) -> Self {
        CollectError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CollectError>;
