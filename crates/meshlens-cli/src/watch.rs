//! `meshlens watch`: stream a running session to the terminal

use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use meshlens_events::EventHistory;
use meshlens_monitor::{Monitor, PanelView};

use crate::cli::ExportFormat;

/// Tracks how much of the published views has been written out
#[derive(Debug, Default)]
pub(crate) struct ViewPrinter {
    printed: usize,
    peer_count: Option<usize>,
}

impl ViewPrinter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Write the history lines and peer count change `view` adds
    pub(crate) fn print(&mut self, view: &PanelView, out: &mut impl Write) -> std::io::Result<()> {
        // A shorter history means the session was restarted.
        if view.history.len() < self.printed {
            self.printed = 0;
        }
        for record in view.history.records_since(self.printed) {
            writeln!(out, "{}", record.display_text())?;
        }
        self.printed = view.history.len();

        let peers = view.topology.as_ref().map(|t| t.peers.len());
        if let Some(count) = peers {
            if peers != self.peer_count {
                debug!(peers = count, "Peer count changed");
                writeln!(out, "-- {} peer(s) --", count)?;
                self.peer_count = peers;
            }
        }
        Ok(())
    }
}

/// Poll `instance` until `shutdown` resolves, writing each new line to `out`
///
/// Returns the history as it stood before the session was stopped.
pub(crate) async fn run<F>(
    monitor: &Monitor,
    instance: &str,
    shutdown: F,
    out: &mut impl Write,
) -> anyhow::Result<EventHistory>
where
    F: Future<Output = std::io::Result<()>>,
{
    // Subscribed first so the first cycle's view is never marked as seen.
    let mut views = monitor.subscribe();
    monitor.start(instance).await?;

    let mut printer = ViewPrinter::new();
    let mut last: Arc<PanelView> = views.borrow_and_update().clone();
    printer.print(&last, out)?;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("waiting for shutdown")?;
                info!("Interrupted");
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                printer.print(&view, out)?;
                last = view;
            }
        }
    }

    monitor.stop().await?;
    Ok(last.history.clone())
}

/// Write `history` to `path`
///
/// Returns the number of exported events, or `None` when the history is
/// empty and nothing was written.
pub(crate) fn export_history(
    history: &EventHistory,
    path: &Path,
    format: ExportFormat,
) -> anyhow::Result<Option<usize>> {
    let text = match format {
        ExportFormat::Json => history.export_json(),
        ExportFormat::Text => history.export_text(),
    };
    let Some(text) = text else {
        return Ok(None);
    };
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(history.len()))
}
