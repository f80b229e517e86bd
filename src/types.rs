// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of the simulation engine
///
/// The engine moves only between these two states: `start` is the single
/// Stopped -> Running transition and `stop` the single Running -> Stopped one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    /// No simulation tasks are producing hashes
    Stopped,

    /// Hash workers and the stats tick are active
    Running,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Stopped => write!(f, "STOPPED"),
            EngineStatus::Running => write!(f, "MINING"),
        }
    }
}

impl FromStr for EngineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stopped" => Ok(EngineStatus::Stopped),
            "running" | "mining" => Ok(EngineStatus::Running),
            _ => Err(format!("Unknown engine status: {}", s)),
        }
    }
}

/// A synthetic share found by a hash worker
///
/// Immutable once created; the share log only ever appends and evicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEvent {
    /// Wall-clock time of discovery, `HH:MM:SS`
    pub time: String,
    /// Cosmetic difficulty in `[1000, 10000]`
    pub difficulty: u32,
    /// Whether the share counted as accepted
    pub accepted: bool,
}

/// Consistent copy of everything the engine exposes to consumers
///
/// Built under a single acquisition of the mining state lock, so no field
/// can be observed half-updated relative to another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Engine lifecycle state
    pub status: EngineStatus,
    /// Convenience flag, `status == Running`
    pub running: bool,
    /// Hashes counted in the last completed stats window
    pub hash_rate: u32,
    /// Hashes since the current run started
    pub total_hashes: u64,
    /// Accepted shares this run
    pub accepted_shares: u32,
    /// Rejected shares this run
    pub rejected_shares: u32,
    /// Run time as `HH:MM:SS`
    pub uptime: String,
    /// Run time in whole seconds
    pub uptime_secs: u64,
    /// Share efficiency, e.g. `"100%"` or `"97.5%"`
    pub efficiency: String,
    /// Synthetic device temperature in Celsius
    pub temperature: i32,
    /// Hash-rate history normalized to `[0, 100]`
    pub sparkline: Vec<u8>,
    /// Most recent shares, oldest first
    pub recent_shares: Vec<ShareEvent>,
    /// Latest known block height
    pub block_height: u64,
    /// Latest known BTC price in USD
    pub btc_price_usd: f64,
    /// Formatted network difficulty
    pub difficulty: String,
    /// Formatted network hashrate
    pub network_hashrate: String,
    /// Time of the last successful network refresh
    pub network_updated_at: Option<chrono::DateTime<chrono::Local>>,
    /// Cosmetic pool label
    pub pool: String,
    /// Cosmetic worker label
    pub worker: String,
}
