//! NerdMiner simulator - a fake mining device with real network telemetry
//!
//! This crate provides the engine behind a NerdMiner-style dashboard:
//! - Synthetic hash workers and share discovery
//! - Rolling hash-rate history, sparkline, uptime and efficiency
//! - Rate-limited BTC price, block height and difficulty from public APIs
//! - A thread-safe start/stop/snapshot API for any UI or HTTP front end

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Simulation engine, hash workers and injectable entropy
pub mod miner;

/// Network data fetching for price and blockchain stats
pub mod network;

/// Rolling statistics and reporting
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use miner::{Engine, Sources};
pub use network::{NetworkFetcher, NetworkSnapshot};
pub use stats::{MiningState, StatsReporter};
pub use types::{EngineStatus, ShareEvent, Snapshot};
pub use utils::{FetchError, MinerError, init_logging};
