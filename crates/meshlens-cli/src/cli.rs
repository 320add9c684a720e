use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "meshlens", about = "Mesh network status and log viewer")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Also write JSONL logs to this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode one snapshot and print node, peers and events
    Inspect {
        /// Snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
        /// Instance to read from the snapshot
        #[arg(long)]
        instance: String,
    },
    /// Poll a snapshot file and print new log lines until Ctrl-C
    Watch {
        /// Snapshot JSON file, re-read every poll
        #[arg(long)]
        snapshot: PathBuf,
        /// Instance to read from the snapshot
        #[arg(long)]
        instance: String,
        /// Monitor settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the collected history here on exit
        #[arg(long)]
        export: Option<PathBuf>,
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
    /// Print the engine TOML for a saved profile
    Render {
        /// Data directory holding profiles.json
        #[arg(long)]
        data_dir: PathBuf,
        /// Profile id; the active profile when omitted
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Raw engine records as a JSON array
    Json,
    /// `[HH:MM:SS] [LEVEL] message` lines
    Text,
}
