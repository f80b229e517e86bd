// src/config/mod.rs
//! Configuration management for the simulator
//!
//! This module handles all configuration-related functionality including:
//! - Loading and validating configuration files
//! - Generating configuration templates
//! - Falling back to defaults when no file is present
//!
//! The configuration uses TOML format with `[simulation]`, `[network]` and
//! `[display]` sections, all optional.

/// Core configuration implementation
///
/// Contains the [`Config`] struct and related types that define
/// the simulator's tunables.
pub mod config;

// Re-export key items for easy access
pub use config::{Config, DisplayConfig, SimulationConfig};

use crate::utils::error::MinerError;
use std::path::Path;

/// Loads simulator configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the configuration file
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(MinerError)` - If the file couldn't be read, parsed or validated
pub fn load(path: impl AsRef<Path>) -> Result<Config, MinerError> {
    Config::load(path.as_ref())
}

/// Loads the file if it exists, otherwise returns validated defaults
pub fn load_or_default(path: impl AsRef<Path>) -> Result<Config, MinerError> {
    let path = path.as_ref();
    if path.exists() {
        load(path)
    } else {
        log::warn!(
            "Config file {} not found, using defaults",
            path.display()
        );
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
