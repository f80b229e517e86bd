// src/cli/commands.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NerdMiner simulator - synthetic mining device with live network data
#[derive(Parser, Debug)]
#[command(name = "nerdminer-sim")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (run the simulation or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the simulator
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Run the simulated device and report its stats
    Run(RunOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for running the simulation
#[derive(Parser, Debug)]
pub struct RunOptions {
    /// Path to configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "nerdminer.toml")]
    pub config: PathBuf,

    /// Number of hash workers (overrides config)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Seconds between two status reports
    #[arg(short, long, default_value_t = 2)]
    pub report_interval: u64,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Print each report as a JSON snapshot on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "nerdminer.toml")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() {
        let cli = Commands::try_parse_from(["nerdminer-sim", "run"]).unwrap();
        match cli.action {
            Action::Run(opts) => {
                assert_eq!(opts.config, PathBuf::from("nerdminer.toml"));
                assert_eq!(opts.report_interval, 2);
                assert!(opts.workers.is_none());
                assert!(!opts.json);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn run_overrides() {
        let cli = Commands::try_parse_from([
            "nerdminer-sim", "run", "-w", "4", "--duration", "10", "--json",
        ])
        .unwrap();
        match cli.action {
            Action::Run(opts) => {
                assert_eq!(opts.workers, Some(4));
                assert_eq!(opts.duration, Some(10));
                assert!(opts.json);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }
}
