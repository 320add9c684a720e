//! Log destinations
//!
//! Console output always goes to stderr so it never mixes with what the
//! CLI prints on stdout. File output is JSONL.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Prefix for log file names
pub const DEFAULT_FILE_PREFIX: &str = "meshlens";

/// Logging setup for one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub console: ConsoleOutput,
    pub file: Option<FileOutput>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleOutput::Human { ansi: true },
            file: None,
        }
    }
}

impl LogConfig {
    /// Terminal use: only warnings and errors, colored
    pub fn interactive() -> Self {
        Self {
            level: "warn".to_string(),
            ..Default::default()
        }
    }

    /// Unattended use: no console, rotated JSONL files under `log_dir`
    pub fn background(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleOutput::Off,
            file: Some(FileOutput::new(log_dir)),
        }
    }

    /// Plain console output for test runs
    pub fn quiet() -> Self {
        Self {
            level: "warn".to_string(),
            console: ConsoleOutput::Human { ansi: false },
            file: None,
        }
    }
}

/// Console format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ConsoleOutput {
    Off,
    Human { ansi: bool },
    /// One JSON object per line
    Json,
}

/// Rotated JSONL file output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutput {
    pub directory: PathBuf,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub rotation: Rotation,
    /// Record source file and line with each event
    #[serde(default)]
    pub with_location: bool,
}

fn default_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

impl FileOutput {
    /// Daily-rotated files named after [`DEFAULT_FILE_PREFIX`]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            prefix: default_prefix(),
            rotation: Rotation::Daily,
            with_location: false,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Path of the single file written with [`Rotation::Never`]
    pub fn fixed_path(&self) -> PathBuf {
        self.directory.join(format!("{}.log", self.prefix))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Daily,
    Hourly,
    /// One file, truncated on start
    Never,
}
