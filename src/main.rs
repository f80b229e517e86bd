// src/main.rs
use clap::Parser;
use nerdminer_sim::stats::ReportFormat;
use nerdminer_sim::utils::init_verbose_logging;
use nerdminer_sim::{self, *};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

/// Main entry point for the simulator
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Run(opts) => run_simulation(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Runs the simulated device until Ctrl-C or the requested duration
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Loads network data once, then starts the engine
/// 4. Reports snapshots until shutdown, then stops the engine
fn run_simulation(opts: cli::RunOptions) -> Result<(), MinerError> {
    if opts.verbose {
        init_verbose_logging();
    } else {
        init_logging();
    }

    let mut config = config::load_or_default(&opts.config)?;
    if let Some(workers) = opts.workers {
        config.simulation.workers = workers;
    }
    config.validate()?;

    let format = if opts.json {
        ReportFormat::Json
    } else {
        ReportFormat::Log
    };
    let report_interval = Duration::from_secs(opts.report_interval.max(1));

    let rt = Runtime::new()?;
    rt.block_on(async move {
        let engine = Engine::new(config)?;
        if !engine.refresh_network().await {
            log::warn!("Initial network data unavailable, will retry in the background");
        }
        engine.start();

        let shutdown = CancellationToken::new();
        let reporter = StatsReporter::new(engine.clone(), report_interval, format);
        let reporting = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { reporter.run(shutdown).await })
        };

        match opts.duration {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                }
            }
            None => tokio::signal::ctrl_c().await?,
        }

        shutdown.cancel();
        reporting.await??;
        engine.stop();

        let summary = engine.snapshot();
        log::info!(
            "Run finished: {} hashes, {} accepted, {} rejected, efficiency {}, uptime {}",
            summary.total_hashes,
            summary.accepted_shares,
            summary.rejected_shares,
            summary.efficiency,
            summary.uptime
        );
        Ok(())
    })
}

/// Writes the configuration template
///
/// # Arguments
/// * `opts` - Configuration generation options
fn generate_config(opts: cli::ConfigOptions) -> Result<(), MinerError> {
    std::fs::write(&opts.output, config::generate_template())?;
    println!("Configuration template written to {}", opts.output.display());
    Ok(())
}
