//! Statistics collection and reporting module
//!
//! This module provides the rolling metrics of the simulated device:
//! - Hash-rate windows and their bounded history
//! - Share log and acceptance/rejection counters
//! - Sparkline normalization, uptime and efficiency formatting
//! - Periodic reporting of engine snapshots
//!
//! [`MiningState`] is the data; the engine owns the lock around it.

/// Counters, bounded buffers and temperature of one device
pub mod state;

/// Lazy normalization of hash-rate history
pub mod sparkline;

/// Periodic log/JSON reporting of snapshots
pub mod reporter;

// Re-export main components
pub use reporter::{ReportFormat, StatsReporter};
pub use sparkline::Sparkline;
pub use state::{BoundedLog, MiningState};
