mod cli;
mod report;
mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use meshlens_events::EventHistory;
use meshlens_logging::{FileOutput, LogConfig, MeshlensSubscriberBuilder};
use meshlens_monitor::{FileBridge, Monitor, MonitorConfig};
use meshlens_profile::ProfileStore;
use meshlens_topology::decode_snapshot;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut logging = MeshlensSubscriberBuilder::new()
        .with_config(LogConfig::interactive())
        .with_level(&cli.log_level);
    if let Some(dir) = &cli.log_dir {
        logging = logging.with_file_output(FileOutput::new(dir));
    }
    let _guard = logging.init();

    match cli.command {
        Command::Inspect { snapshot, instance } => inspect(&snapshot, &instance)?,

        Command::Watch {
            snapshot,
            instance,
            config,
            export,
            format,
        } => {
            let config = match config {
                Some(path) => MonitorConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => MonitorConfig::default(),
            };
            let history = watch_command(snapshot, &instance, config).await?;
            if let Some(path) = export {
                match watch::export_history(&history, &path, format)? {
                    Some(count) => println!("Exported {} events to {}", count, path.display()),
                    None => println!("No events collected, nothing exported"),
                }
            }
        }

        Command::Render { data_dir, id } => {
            let book = ProfileStore::new(&data_dir).load();
            let profile = match id.as_deref() {
                Some(id) => book
                    .get(id)
                    .with_context(|| format!("no profile with id {id}"))?,
                None => book.active(),
            };
            print!("{}", profile.render_toml()?);
        }
    }

    Ok(())
}

fn inspect(snapshot: &Path, instance: &str) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(snapshot)
        .with_context(|| format!("reading {}", snapshot.display()))?;
    let decoded = decode_snapshot(&json, instance)?;

    println!("{}", report::inspect_report(&decoded));
    Ok(())
}

async fn watch_command(
    snapshot: PathBuf,
    instance: &str,
    config: MonitorConfig,
) -> anyhow::Result<EventHistory> {
    let bridge = Arc::new(FileBridge::new(snapshot, instance));
    let monitor = Monitor::new(bridge, config);
    let mut stdout = std::io::stdout();
    watch::run(&monitor, instance, tokio::signal::ctrl_c(), &mut stdout).await
}
