//! Subscriber setup for hosts that do not install their own.

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{CollectError, Result};

/// Where and how much the collector logs
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// File name prefix of the rolling log, e.g. `emit`
    pub component: String,
    pub dir: PathBuf,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub filter: String,
    pub to_stderr: bool,
}

impl LogOptions {
    /// Defaults to `$HOME/.satchel/logs` at `info`, file only.
    pub fn new(component: impl Into<String>) -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self {
            component: component.into(),
            dir: Path::new(&home).join(".satchel").join("logs"),
            filter: "info".to_string(),
            to_stderr: false,
        }
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_stderr(mut self, to_stderr: bool) -> Self {
        self.to_stderr = to_stderr;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter).map_err(|e| {
                CollectError::Config(format!("invalid log filter '{}': {}", self.filter, e))
            }),
        }
    }
}

/// Install the global subscriber described by `options`.
///
/// Logs roll daily into `<dir>/<component>.<date>`. Keep the returned guard
/// alive for as long as logs should be flushed. Fails with
/// [`CollectError::Logging`] when a global subscriber is already installed,
/// e.g. by the host or an earlier call.
pub fn init_logging(options: &LogOptions) -> Result<WorkerGuard> {
    let filter = options.env_filter()?;
    std::fs::create_dir_all(&options.dir).map_err(|e| CollectError::io(&options.dir, e))?;

    let file_appender = tracing_appender::rolling::daily(&options.dir, &options.component);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let stderr_layer = options.to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| CollectError::Logging(e.to_string()))?;

    Ok(guard)
}
