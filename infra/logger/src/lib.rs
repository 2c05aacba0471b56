//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for the catalog services:
//! a compact console layer, an optional daily rolling file (plain or JSON)
//! written through a non-blocking worker, and an `EnvFilter` built from the
//! configured level or directive (`RUST_LOG` is honored when no directive is set).
//!
//! ```rust
//! # use catalog_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("catalog")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use catalog_domain::config::LoggerConfig;
use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 14;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug)]
struct Settings {
    console: bool,
    dir: Option<PathBuf>,
    level: LevelFilter,
    directive: Option<String>,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            console: true,
            dir: None,
            level: LevelFilter::INFO,
            directive: None,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Builder for the global subscriber. A name is required before `init`;
/// file-only knobs become available after `path`.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    settings: Settings,
    name: N,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Sets the logger name, also the prefix of rolling files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { settings: self.settings, name: WithName(name.into()), file: PhantomData }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    #[must_use]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }

    /// Writes file records as JSON lines.
    #[must_use]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.json = enabled;
        self
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.settings.level = level;
        self
    }

    /// Full `EnvFilter` directive such as `catalog=debug,tower_http=info`.
    /// Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use]
    pub fn env_filter(mut self, directive: impl Into<String>) -> Self {
        self.settings.directive = Some(directive.into());
        self
    }

    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Enables daily rolling files in `dir`.
    pub fn path(self, dir: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut settings = self.settings;
        settings.dir = Some(dir.into());
        LoggerBuilder { settings, name: self.name, file: PhantomData }
    }

    /// Installs the global subscriber.
    ///
    /// Keep the returned [`Logger`] alive for the whole program: it owns the
    /// worker guard that flushes file output.
    ///
    /// # Errors
    /// * [`LoggerError::Subscriber`] if a subscriber is already installed.
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`,
    ///   a bad directive or no enabled output.
    /// * [`LoggerError::Appender`] / [`LoggerError::Internal`] when the log directory is unusable.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let Self { settings, name: WithName(name), .. } = self;
        validate(&settings, &name)?;
        let filter = env_filter(&settings)?;

        let mut layers = Vec::new();
        if settings.console {
            layers.push(layer().compact().with_ansi(true).with_target(true).boxed());
        }

        let guard = match &settings.dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Failed to create {}", dir.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(settings.rotation.clone())
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(dir)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if settings.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "no output enabled; turn on the console or set a log directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        tracing::debug!(logger = %name, file = guard.is_some(), "Logger initialized");

        Ok(Logger { guard })
    }
}

/// Handle of the installed logging system. Dropping it flushes and stops the file worker.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { settings: Settings::default(), name: NoName, file: PhantomData }
    }

    /// Installs the subscriber described by the `[logger]` config section.
    ///
    /// # Errors
    /// Same as [`LoggerBuilder::init`], plus an unknown `level` string.
    pub fn from_config(name: &str, config: &LoggerConfig) -> Result<Self, LoggerError> {
        let level = LevelFilter::from_str(&config.level).map_err(|e| {
            LoggerError::InvalidConfiguration {
                message: format!("unknown level '{}': {e}", config.level).into(),
                context: None,
            }
        })?;

        let builder = Self::builder().name(name).level(level).console(config.console);
        let builder = match &config.filter {
            Some(directive) => builder.env_filter(directive.clone()),
            None => builder,
        };

        match &config.dir {
            Some(dir) => builder.path(dir).json(config.json).init(),
            None => builder.init(),
        }
    }

    /// `true` when a file writer is attached.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers");
        }
    }
}

fn validate(settings: &Settings, name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "logger name cannot be empty".into(),
            context: None,
        });
    }
    if settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn env_filter(settings: &Settings) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(settings.level.into());
    match &settings.directive {
        Some(directive) => builder.parse(directive).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("invalid filter '{directive}': {e}").into(),
            context: None,
        }),
        None => Ok(builder.from_env_lossy()),
    }
}
