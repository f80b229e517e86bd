// src/utils/logging.rs
//! Logging configuration and utilities
//!
//! This module handles logging setup for the simulator, including:
//! - Standard logging configuration
//! - Verbose logging for watching individual ticks and fetches
//! - Custom log formatting
//!
//! Uses `env_logger` under the hood with custom formatting and filtering.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem with sensible defaults
///
/// # Configuration
/// - Logs to stdout
/// - Default log level: Info
/// - Custom timestamp and source location formatting
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging() {
    let mut builder = common_log_config();
    builder.filter_level(LevelFilter::Info);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.try_init();
}

/// Configures verbose logging
///
/// # Differences from Standard Logging
/// - Default log level: Debug (if RUST_LOG not set)
/// - Shows stats ticks, share discoveries and fetch failures
pub fn init_verbose_logging() {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_err() {
        builder.filter_level(LevelFilter::Debug);
    } else {
        builder.parse_env("RUST_LOG");
    }

    let _ = builder.try_init();
}

/// Creates the base logger builder shared by both modes
///
/// # Features
/// - One line per record:
///   - Timestamp (seconds precision)
///   - Level, padded so messages line up
///   - Emitting module, with the `nerdminer_sim::` prefix stripped
///   - Message
/// - Output to stdout, so the status lines and logs share one stream
///
/// # Returns
/// Builder without a level filter; callers add their own
fn common_log_config() -> Builder {
    let mut builder = Builder::new();
    builder.target(Target::Stdout).format(|buf, record| {
        use std::io::Write;
        let module = record.module_path().unwrap_or("?");
        let module = module.strip_prefix("nerdminer_sim::").unwrap_or(module);
        writeln!(
            buf,
            "[{} {:<5} {}] {}",
            buf.timestamp_seconds(),
            record.level(),
            module,
            record.args()
        )
    });
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        init_logging();
        init_verbose_logging();
        log::info!("logger still usable");
    }
}
