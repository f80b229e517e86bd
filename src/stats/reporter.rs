// src/stats/reporter.rs
use crate::miner::Engine;
use crate::types::Snapshot;
use crate::utils::error::MinerError;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// How a report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// One human-readable status line through the logger
    Log,
    /// One JSON document per report on stdout
    Json,
}

/// Periodically reports engine snapshots
pub struct StatsReporter {
    /// Engine being observed
    engine: Engine,
    /// Interval at which stats are reported
    report_interval: Duration,
    /// Output rendering
    format: ReportFormat,
}

impl StatsReporter {
    /// Creates a reporter for `engine`
    ///
    /// # Arguments
    /// * `engine` - Engine to observe
    /// * `report_interval` - How often to report
    /// * `format` - Log line or JSON output
    pub fn new(engine: Engine, report_interval: Duration, format: ReportFormat) -> Self {
        StatsReporter {
            engine,
            report_interval,
            format,
        }
    }

    /// Renders one snapshot as a status line
    pub fn status_line(snapshot: &Snapshot) -> String {
        format!(
            "{} | Hashrate: {} H/s | Total: {} | Shares A/R: {}/{} ({}) | Uptime: {} | Temp: {}°C | Block: {} | BTC: ${:.0} | Diff: {} | Net: {}",
            snapshot.status,
            snapshot.hash_rate,
            snapshot.total_hashes,
            snapshot.accepted_shares,
            snapshot.rejected_shares,
            snapshot.efficiency,
            snapshot.uptime,
            snapshot.temperature,
            snapshot.block_height,
            snapshot.btc_price_usd,
            snapshot.difficulty,
            snapshot.network_hashrate
        )
    }

    /// Takes a snapshot and emits it
    ///
    /// # Errors
    /// Returns `JsonError` if the snapshot cannot be serialized
    pub fn report_once(&self) -> Result<Snapshot, MinerError> {
        let snapshot = self.engine.snapshot();
        match self.format {
            ReportFormat::Log => log::info!("{}", Self::status_line(&snapshot)),
            ReportFormat::Json => println!("{}", serde_json::to_string(&snapshot)?),
        }
        Ok(snapshot)
    }

    /// Reports every interval until `shutdown` fires
    ///
    /// The first report is emitted one interval after the call.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), MinerError> {
        let mut ticker = time::interval_at(
            time::Instant::now() + self.report_interval,
            self.report_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    self.report_once()?;
                }
            }
        }
    }
}
