//! Background poll task
//!
//! Runs one cycle per tick until shutdown. Cycles are strictly sequential:
//! the next tick is only awaited after the previous cycle returns, and
//! missed ticks are delayed rather than burst.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::MonitorError;
use crate::session::SessionCore;

/// Background poll task
pub(crate) struct PollTask {
    core: Arc<SessionCore>,
    poll_interval: Duration,
    shutdown_rx: broadcast::Receiver<()>,
    cycle_count: u64,
}

impl PollTask {
    /// Spawn the poll task as a background task
    pub(crate) fn spawn(
        core: Arc<SessionCore>,
        poll_interval: Duration,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let task = Self {
            core,
            poll_interval,
            shutdown_rx,
            cycle_count: 0,
        };

        tokio::spawn(async move {
            task.run().await;
        })
    }

    async fn run(mut self) {
        info!(
            instance = %self.core.instance_name(),
            interval_ms = self.poll_interval.as_millis() as u64,
            "Poll task started"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => break,
                _ = interval.tick() => {
                    self.cycle_count += 1;
                    // A stop during a slow fetch abandons the cycle.
                    tokio::select! {
                        _ = self.shutdown_rx.recv() => break,
                        result = self.core.cycle() => self.log_cycle(result.err()),
                    }
                }
            }
        }

        info!(
            instance = %self.core.instance_name(),
            cycles = self.cycle_count,
            "Poll task shutting down"
        );
    }

    fn log_cycle(&self, error: Option<MonitorError>) {
        match error {
            None => {}
            Some(MonitorError::NotRunning) | Some(MonitorError::NoData) => {
                debug!(cycle = self.cycle_count, "No update this cycle");
            }
            Some(e) => {
                warn!(cycle = self.cycle_count, error = %e, "Poll cycle failed");
            }
        }
    }
}
