// src/config/config.rs
use crate::{network::fetcher::NetworkConfig, utils::error::MinerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for the simulator
///
/// Every section has defaults, so an empty file (or no file at all) yields
/// the stock two-worker simulation against the public data sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Synthetic mining activity
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// External price and blockchain data sources
    #[serde(default)]
    pub network: NetworkConfig,

    /// Cosmetic labels shown by dashboards
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Tunables of the hashing simulation
///
/// None of these carry real mining meaning; they only shape how busy the
/// fake device looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of concurrent hash workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Delay between two hashes of the same worker, in milliseconds
    #[serde(default = "default_hash_interval_ms")]
    pub hash_interval_ms: u64,

    /// Length of one hash-rate window, in milliseconds
    #[serde(default = "default_stats_interval_ms")]
    pub stats_interval_ms: u64,

    /// Chance that a single hash yields a share
    #[serde(default = "default_share_probability")]
    pub share_probability: f64,

    /// Chance that a found share is counted as rejected
    #[serde(default)]
    pub reject_ratio: f64,
}

/// Labels carried into every snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Pool label, purely cosmetic
    #[serde(default = "default_pool")]
    pub pool: String,

    /// Worker label, purely cosmetic
    #[serde(default = "default_worker")]
    pub worker: String,
}

fn default_workers() -> usize {
    2
}

fn default_hash_interval_ms() -> u64 {
    1
}

fn default_stats_interval_ms() -> u64 {
    1000
}

fn default_share_probability() -> f64 {
    0.001
}

fn default_pool() -> String {
    "nerdminer.com:3333".into()
}

fn default_worker() -> String {
    "nerdminer-sim".into()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            workers: default_workers(),
            hash_interval_ms: default_hash_interval_ms(),
            stats_interval_ms: default_stats_interval_ms(),
            share_probability: default_share_probability(),
            reject_ratio: 0.0,
        }
    }
}

impl SimulationConfig {
    /// Delay between two hashes of one worker
    pub fn hash_interval(&self) -> Duration {
        Duration::from_millis(self.hash_interval_ms)
    }

    /// Length of one hash-rate window
    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            pool: default_pool(),
            worker: default_worker(),
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(MinerError)` - If file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), MinerError> {
        let sim = &self.simulation;
        if sim.workers == 0 {
            return Err(MinerError::ConfigError(
                "simulation.workers must be at least 1".into(),
            ));
        }
        if sim.hash_interval_ms == 0 || sim.stats_interval_ms == 0 {
            return Err(MinerError::ConfigError(
                "simulation intervals must be non-zero".into(),
            ));
        }
        for (name, value) in [
            ("share_probability", sim.share_probability),
            ("reject_ratio", sim.reject_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MinerError::ConfigError(format!(
                    "simulation.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let net = &self.network;
        if net.request_timeout_secs == 0 || net.request_timeout_secs > 30 {
            return Err(MinerError::ConfigError(format!(
                "network.request_timeout_secs must be within 1..=30, got {}",
                net.request_timeout_secs
            )));
        }
        if net.poll_interval_secs == 0 {
            return Err(MinerError::ConfigError(
                "network.poll_interval_secs must be non-zero".into(),
            ));
        }
        for url in [&net.price_url, &net.block_height_url, &net.difficulty_url] {
            Url::parse(url)
                .map_err(|e| MinerError::ConfigError(format!("Invalid URL '{}': {}", url, e)))?;
        }

        Ok(())
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration with the defaults
    pub fn generate_template() -> String {
        let sim = SimulationConfig::default();
        let net = NetworkConfig::default();
        let display = DisplayConfig::default();

        let mut template = String::new();
        template.push_str("# NerdMiner simulator configuration\n\n");
        template.push_str("[simulation]\n");
        template.push_str("# Number of concurrent hash workers\n");
        template.push_str(&format!("workers = {}\n", sim.workers));
        template.push_str("# Delay between hashes of one worker (ms)\n");
        template.push_str(&format!("hash_interval_ms = {}\n", sim.hash_interval_ms));
        template.push_str("# Hash-rate window length (ms)\n");
        template.push_str(&format!("stats_interval_ms = {}\n", sim.stats_interval_ms));
        template.push_str("# Chance per hash of finding a share\n");
        template.push_str(&format!("share_probability = {}\n", sim.share_probability));
        template.push_str("# Chance a found share is rejected\n");
        template.push_str(&format!("reject_ratio = {:.1}\n\n", sim.reject_ratio));

        template.push_str("[network]\n");
        template.push_str(&format!("price_url = \"{}\"\n", net.price_url));
        template.push_str(&format!("block_height_url = \"{}\"\n", net.block_height_url));
        template.push_str(&format!("difficulty_url = \"{}\"\n", net.difficulty_url));
        template.push_str("# Minimum seconds between two successful refreshes\n");
        template.push_str(&format!("refresh_interval_secs = {}\n", net.refresh_interval_secs));
        template.push_str("# How often the refresh task checks the gate\n");
        template.push_str(&format!("poll_interval_secs = {}\n", net.poll_interval_secs));
        template.push_str("# Per-request timeout (1-30 s)\n");
        template.push_str(&format!("request_timeout_secs = {}\n\n", net.request_timeout_secs));

        template.push_str("[display]\n");
        template.push_str(&format!("pool = \"{}\"\n", display.pool));
        template.push_str(&format!("worker = \"{}\"\n", display.worker));

        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.simulation.workers, 2);
        assert_eq!(config.simulation.share_probability, 0.001);
        assert_eq!(config.network.refresh_interval_secs, 60);
        config.validate().unwrap();
    }

    #[test]
    fn template_round_trips_to_defaults() {
        let config: Config = toml::from_str(&Config::generate_template()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            "[simulation]\nworkers = 4\n\n[display]\nworker = \"desk\"\n",
        )
        .unwrap();
        assert_eq!(config.simulation.workers, 4);
        assert_eq!(config.simulation.hash_interval_ms, 1);
        assert_eq!(config.display.worker, "desk");
        assert_eq!(config.display.pool, "nerdminer.com:3333");
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.simulation.share_probability = 1.5;
        assert!(matches!(config.validate(), Err(MinerError::ConfigError(_))));

        let mut config = Config::default();
        config.simulation.workers = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.network.request_timeout_secs = 90;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.network.price_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
