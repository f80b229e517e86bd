// src/miner/entropy.rs
//! Injectable time and randomness
//!
//! The engine never calls `Instant::now()` or `rand` directly. Production code
//! uses [`SystemClock`] and [`ThreadRandom`]; tests substitute [`ManualClock`]
//! and [`ScriptedRandom`] to get exact, repeatable outcomes. Those two are
//! only compiled for tests or with the `test-util` feature.

use chrono::{DateTime, Local};
use rand::Rng;
use std::time::Instant;
#[cfg(any(test, feature = "test-util"))]
use {
    parking_lot::Mutex,
    std::collections::VecDeque,
    std::time::Duration,
};

/// Source of monotonic and wall-clock time
pub trait Clock: Send + Sync {
    /// Monotonic instant used for uptime and rate limiting
    fn now(&self) -> Instant;

    /// Local wall-clock time used for share timestamps and display
    fn wall_clock(&self) -> DateTime<Local>;
}

/// Source of uniform random values
pub trait RandomSource: Send + Sync {
    /// Uniform float in `[0, 1)`
    fn unit(&self) -> f64;

    /// Uniform integer in `low..=high`
    fn between(&self, low: u32, high: u32) -> u32;

    /// Bernoulli trial with success probability `p`
    fn chance(&self, p: f64) -> bool {
        self.unit() < p
    }
}

/// Real clock backed by `Instant` and `chrono::Local`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(any(test, feature = "test-util"))]
/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    base_wall: DateTime<Local>,
    offset: Mutex<Duration>,
}

#[cfg(any(test, feature = "test-util"))]
impl ManualClock {
    /// Creates a clock frozen at the current instant
    pub fn new() -> Self {
        ManualClock {
            base: Instant::now(),
            base_wall: Local::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Moves both monotonic and wall-clock time forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }

    fn wall_clock(&self) -> DateTime<Local> {
        let offset = *self.offset.lock();
        self.base_wall + chrono::Duration::from_std(offset).unwrap_or(chrono::Duration::zero())
    }
}

/// Randomness from the thread-local `rand` generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn unit(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }

    fn between(&self, low: u32, high: u32) -> u32 {
        rand::thread_rng().gen_range(low..=high)
    }
}

#[cfg(any(test, feature = "test-util"))]
/// Replays fixed sequences, cycling when exhausted
///
/// `between` clamps scripted integers into the requested range so a single
/// script can serve several call sites.
#[derive(Debug)]
pub struct ScriptedRandom {
    units: Mutex<VecDeque<f64>>,
    integers: Mutex<VecDeque<u32>>,
}

#[cfg(any(test, feature = "test-util"))]
impl ScriptedRandom {
    /// Creates a source replaying `units` for `unit()` and `integers` for `between()`
    ///
    /// An empty `units` script always yields `0.5`; an empty `integers`
    /// script always yields the low bound.
    pub fn new(units: Vec<f64>, integers: Vec<u32>) -> Self {
        ScriptedRandom {
            units: Mutex::new(units.into()),
            integers: Mutex::new(integers.into()),
        }
    }

    /// Source whose trials never succeed and whose integers sit at the low bound
    pub fn quiet() -> Self {
        Self::new(vec![0.999_999], Vec::new())
    }
}

#[cfg(any(test, feature = "test-util"))]
impl RandomSource for ScriptedRandom {
    fn unit(&self) -> f64 {
        let mut units = self.units.lock();
        match units.pop_front() {
            Some(value) => {
                units.push_back(value);
                value
            }
            None => 0.5,
        }
    }

    fn between(&self, low: u32, high: u32) -> u32 {
        let mut integers = self.integers.lock();
        match integers.pop_front() {
            Some(value) => {
                integers.push_back(value);
                value.clamp(low, high)
            }
            None => low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new();
        let start = clock.now();
        let wall = clock.wall_clock();
        assert_eq!(clock.now(), start);

        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now() - start, Duration::from_secs(90));
        assert_eq!((clock.wall_clock() - wall).num_seconds(), 90);
    }

    #[test]
    fn scripted_random_cycles_and_clamps() {
        let rng = ScriptedRandom::new(vec![0.1, 0.9], vec![5, 50_000]);
        assert!(rng.chance(0.5));
        assert!(!rng.chance(0.5));
        assert!(rng.chance(0.5));

        assert_eq!(rng.between(1000, 10_000), 1000);
        assert_eq!(rng.between(1000, 10_000), 10_000);
    }

    #[test]
    fn thread_random_stays_in_range() {
        let rng = ThreadRandom;
        for _ in 0..1000 {
            let v = rng.between(40, 60);
            assert!((40..=60).contains(&v));
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
