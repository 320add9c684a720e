//! Tracing subscriber setup for meshlens
//!
//! Every meshlens crate logs through `tracing`; this crate decides where
//! those events go. The binary calls it once at startup.
//!
//! - Console: human-readable or JSON lines on stderr
//! - Files: JSONL through a non-blocking `tracing-appender` writer
//! - `RUST_LOG` takes precedence over [`LogConfig::level`]
//!
//! ```ignore
//! use meshlens_logging::{FileOutput, LogConfig, MeshlensSubscriberBuilder};
//!
//! let _guard = MeshlensSubscriberBuilder::new()
//!     .with_config(LogConfig::interactive())
//!     .with_file_output(FileOutput::new("./logs"))
//!     .init();
//! ```
//!
//! Keep the returned guard alive for as long as file output should be
//! flushed.

pub mod config;

pub use config::{ConsoleOutput, DEFAULT_FILE_PREFIX, FileOutput, LogConfig, Rotation};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to prepare log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Builds and installs the global subscriber
#[derive(Debug, Clone, Default)]
pub struct MeshlensSubscriberBuilder {
    config: LogConfig,
}

impl MeshlensSubscriberBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the filter directive used when `RUST_LOG` is unset
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.level = level.into();
        self
    }

    pub fn with_console(mut self, console: ConsoleOutput) -> Self {
        self.config.console = console;
        self
    }

    /// Add JSONL file output
    pub fn with_file_output(mut self, file: FileOutput) -> Self {
        self.config.file = Some(file);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Install the subscriber, reporting failures on stderr
    ///
    /// Returns the file writer guard when file output is configured.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Warning: logging not initialized: {}", e);
                None
            }
        }
    }

    /// Install the subscriber
    ///
    /// Fails if the log directory cannot be prepared or a global subscriber
    /// is already set.
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.level));

        let mut layers: Vec<BoxedLayer> = Vec::new();
        if let Some(console) = console_layer(self.config.console) {
            layers.push(console);
        }

        let mut guard = None;
        if let Some(file) = &self.config.file {
            let (writer, file_guard) = file_writer(file)?;
            layers.push(file_layer(file, writer));
            guard = Some(file_guard);
        }

        Registry::default().with(layers).with(filter).try_init()?;
        Ok(guard)
    }
}

fn console_layer(console: ConsoleOutput) -> Option<BoxedLayer> {
    match console {
        ConsoleOutput::Off => None,
        ConsoleOutput::Human { ansi } => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_target(false)
                .boxed(),
        ),
        ConsoleOutput::Json => Some(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr)
                .boxed(),
        ),
    }
}

fn file_layer(file: &FileOutput, writer: NonBlocking) -> BoxedLayer {
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_file(file.with_location)
        .with_line_number(file.with_location)
        .with_writer(writer)
        .boxed()
}

/// `Never` truncates one fixed file; the rolling modes append
fn file_writer(file: &FileOutput) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&file.directory)?;
    let period = match file.rotation {
        Rotation::Never => {
            let log_file = File::create(file.fixed_path())?;
            return Ok(tracing_appender::non_blocking(log_file));
        }
        Rotation::Daily => rolling::Rotation::DAILY,
        Rotation::Hourly => rolling::Rotation::HOURLY,
    };
    let appender = RollingFileAppender::new(period, &file.directory, &file.prefix);
    Ok(tracing_appender::non_blocking(appender))
}
