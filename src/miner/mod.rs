// src/miner/mod.rs
//! Simulated mining
//!
//! This module contains everything that produces synthetic activity:
//! - The engine controller and its lifecycle
//! - Hash worker tasks
//! - Injectable clock and randomness

/// Engine controller
///
/// Starts and stops runs, spawns the run's tasks and builds snapshots.
pub mod engine;

/// Hash worker task
///
/// Computes throwaway digests, counts them and rolls for shares.
pub mod worker;

/// Clock and random source abstractions with real and scripted versions
pub mod entropy;

// Re-export main components for cleaner imports
pub use self::engine::{Engine, Sources};
pub use self::entropy::{Clock, RandomSource, SystemClock, ThreadRandom};
#[cfg(any(test, feature = "test-util"))]
pub use self::entropy::{ManualClock, ScriptedRandom};
pub use self::worker::{HashWorker, WorkerParams};
