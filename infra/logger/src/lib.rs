//! # Logger
//!
//! One place to install the process-wide `tracing` subscriber.
//!
//! The builder combines an [`EnvFilter`] (programmatic default, overridable through
//! `RUST_LOG`), a compact console layer and an optional rolling file layer written by a
//! non-blocking background worker. The returned [`Logger`] owns that worker; keep it alive
//! until shutdown or buffered lines are lost.
//!
//! ```rust
//! use cohort_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder("cohort-server")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("cohort_division=trace")
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct FileOutput {
    directory: PathBuf,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

/// Builder for the global subscriber. Created by [`Logger::builder`].
#[derive(Debug)]
#[must_use = "call .init() to install the subscriber"]
pub struct LoggerBuilder {
    name: String,
    console: bool,
    level: LevelFilter,
    env_filter: Option<String>,
    file: Option<FileOutput>,
}

impl LoggerBuilder {
    /// Minimum level emitted when neither `RUST_LOG` nor [`Self::env_filter`] say otherwise.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Programmatic filter directives such as `cohort_division=debug,hyper=warn`.
    ///
    /// Invalid directives make [`Self::init`] fail.
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.env_filter = Some(directives.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Also writes to rolling files named `<name>.<date>.log` inside `directory`.
    pub fn path(mut self, directory: impl Into<PathBuf>) -> Self {
        self.file = Some(FileOutput {
            directory: directory.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        });
        self
    }

    /// Rotation strategy for file output. Ignored without [`Self::path`].
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    /// Number of rotated files to keep. Ignored without [`Self::path`].
    pub fn max_files(mut self, max_files: usize) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.max_files = max_files;
        }
        self
    }

    /// Writes file output as JSON lines. Ignored without [`Self::path`].
    pub fn json(mut self) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.json = true;
        }
        self
    }

    /// Installs the subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, `max_files == 0`, bad filter
    ///   directives, or when no output is enabled.
    /// * [`LoggerError::Appender`] if the log directory cannot be used.
    /// * [`LoggerError::Subscriber`] if a global subscriber already exists.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;
        let filter = self.build_filter()?;

        let mut layers = Vec::new();
        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match self.file {
            Some(file) => {
                fs::create_dir_all(&file.directory).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(
                        format!("Failed to create log directory {}", file.directory.display())
                            .into(),
                    ),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(file.rotation)
                    .filename_prefix(&self.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(file.max_files)
                    .build(&file.directory)
                    .context("Failed to build rolling file appender")?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if file.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        if !self.console && self.file.is_none() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No output enabled; enable the console or set a log path".into(),
                context: None,
            });
        }
        if self.file.as_ref().is_some_and(|file| file.max_files == 0) {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.env_filter {
            None => Ok(builder.from_env_lossy()),
            Some(directives) => {
                builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                    message: format!("Invalid env filter '{directives}': {e}").into(),
                    context: None,
                })
            },
        }
    }
}

/// Handle to the installed subscriber.
///
/// Dropping it stops the background file writer after flushing pending lines.
#[must_use = "dropping the handle stops background file logging"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder. `name` prefixes rolling log files.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            console: true,
            level: LevelFilter::INFO,
            env_filter: None,
            file: None,
        }
    }

    /// Whether file output (and therefore a background worker) is active.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder("test-app");
        assert!(builder.console);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert!(builder.file.is_none());
        assert!(builder.env_filter.is_none());
    }

    #[test]
    fn file_options_apply_only_after_path() {
        let builder = Logger::builder("test-app").json().max_files(3);
        assert!(builder.file.is_none());

        let builder = Logger::builder("test-app").path("logs").json().max_files(3);
        let file = builder.file.as_ref().expect("file output configured");
        assert!(file.json);
        assert_eq!(file.max_files, 3);
    }

    #[test]
    fn rejects_empty_name_and_missing_outputs() {
        let err = Logger::builder("  ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder("silent").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn rejects_invalid_filter_directives() {
        let builder = Logger::builder("test-app").env_filter("cohort=notalevel");
        let err = builder.build_filter().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
