// src/utils/mod.rs
//! Utilities module for common functionality
//!
//! This module contains shared utilities used throughout the simulator,
//! including error handling, logging infrastructure and value formatting.

/// Error types and handling utilities
///
/// Contains the [`MinerError`] enum for application-level failures and the
/// [`FetchError`] taxonomy used by the network fetcher.
pub mod error;

/// Logging configuration and utilities
///
/// Provides logging initialization and configuration for the application,
/// including formatting and output destinations.
pub mod logging;

/// Formatting helpers for uptime, efficiency, difficulty and hashrate
pub mod format;

// Re-export for easier access
pub use error::{FetchError, MinerError};
pub use logging::{init_logging, init_verbose_logging};
