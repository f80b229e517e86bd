// src/network/mod.rs
//! Network data components
//!
//! This module mirrors real-world data next to the simulated device:
//! - `NetworkFetcher`: rate-limited, last-known-good cache of BTC price,
//!   block height, difficulty and implied network hashrate
//! - `Transport`: the HTTP seam the fetcher talks through

/// Price and blockchain data fetcher
///
/// Refreshes at most once per refresh interval unless forced, and keeps the
/// previous values whenever a request fails.
pub mod fetcher;

/// HTTP transport abstraction
///
/// `HttpTransport` wraps reqwest; `ScriptedTransport` (behind the
/// `test-util` feature) answers from a table.
pub mod transport;

// Re-export main components for cleaner imports
pub use fetcher::{NetworkConfig, NetworkFetcher, NetworkSnapshot};
pub use transport::{HttpTransport, Transport};
#[cfg(any(test, feature = "test-util"))]
pub use transport::ScriptedTransport;
