// src/stats/state.rs
//! Counters, buffers and derived metrics of one simulated device
//!
//! [`MiningState`] holds no lock of its own. The engine keeps it behind a
//! single mutex and performs every mutation below inside one critical
//! section, which is what makes snapshots consistent.

use super::sparkline::Sparkline;
use crate::miner::entropy::RandomSource;
use crate::types::ShareEvent;
use crate::utils::format::{format_efficiency, format_uptime};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Maximum number of shares kept in the share log
pub const SHARE_LOG_CAPACITY: usize = 5;

/// Maximum number of hash-rate samples kept for the sparkline
pub const HASH_HISTORY_CAPACITY: usize = 30;

/// Temperature band of the random walk while running
pub const TEMPERATURE_RANGE: (i32, i32) = (40, 60);

/// Temperature the device cools toward while stopped
pub const TEMPERATURE_FLOOR: i32 = 35;

/// Temperature of a freshly constructed device
pub const INITIAL_TEMPERATURE: i32 = 45;

/// Largest single step of the temperature random walk
const TEMPERATURE_STEP: u32 = 2;

/// FIFO buffer that drops its oldest entry once full
#[derive(Debug, Clone)]
pub struct BoundedLog<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Creates an empty log holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        BoundedLog {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends `item`, evicting the oldest entry if the log is full
    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no entries are held
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Copies the entries out, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// Mutable state of the simulated device
#[derive(Debug, Clone)]
pub struct MiningState {
    running: bool,
    generation: u64,
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    total_hashes: u64,
    hashes_at_last_tick: u64,
    hash_rate: u32,
    accepted_shares: u32,
    rejected_shares: u32,
    share_log: BoundedLog<ShareEvent>,
    hash_history: BoundedLog<u32>,
    temperature: i32,
}

impl Default for MiningState {
    fn default() -> Self {
        Self::new()
    }
}

impl MiningState {
    /// Creates a stopped device at the initial temperature
    pub fn new() -> Self {
        MiningState {
            running: false,
            generation: 0,
            started_at: None,
            stopped_at: None,
            total_hashes: 0,
            hashes_at_last_tick: 0,
            hash_rate: 0,
            accepted_shares: 0,
            rejected_shares: 0,
            share_log: BoundedLog::new(SHARE_LOG_CAPACITY),
            hash_history: BoundedLog::new(HASH_HISTORY_CAPACITY),
            temperature: INITIAL_TEMPERATURE,
        }
    }

    /// Starts a new run, resetting counters and buffers
    ///
    /// Returns the new run's generation, or `None` if a run is already
    /// active, in which case nothing is touched.
    pub fn begin_run(&mut self, now: Instant) -> Option<u64> {
        if self.running {
            return None;
        }
        self.running = true;
        self.generation += 1;
        self.started_at = Some(now);
        self.stopped_at = None;
        self.total_hashes = 0;
        self.hashes_at_last_tick = 0;
        self.hash_rate = 0;
        self.accepted_shares = 0;
        self.rejected_shares = 0;
        self.share_log.clear();
        self.hash_history.clear();
        Some(self.generation)
    }

    /// Ends the active run; returns false if nothing was running
    pub fn end_run(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.stopped_at = Some(now);
        self.hash_rate = 0;
        true
    }

    /// True while `generation` is the active run
    pub fn is_current(&self, generation: u64) -> bool {
        self.running && self.generation == generation
    }

    /// Counts one computed hash
    pub fn record_hash(&mut self) {
        self.total_hashes += 1;
    }

    /// Adds `count` hashes at once
    pub fn record_hashes(&mut self, count: u64) {
        self.total_hashes += count;
    }

    /// Logs a found share and bumps the matching counter
    pub fn record_share(&mut self, share: ShareEvent) {
        if share.accepted {
            self.accepted_shares = self.accepted_shares.saturating_add(1);
        } else {
            self.rejected_shares = self.rejected_shares.saturating_add(1);
        }
        self.share_log.push(share);
    }

    /// Closes the current hash-rate window
    ///
    /// Publishes the window's hash count as `hash_rate`, then appends that
    /// same value to the history. Both happen before the caller releases the
    /// lock, so readers never see one without the other.
    pub fn complete_window(&mut self) -> u32 {
        let window = self.total_hashes.saturating_sub(self.hashes_at_last_tick);
        self.hashes_at_last_tick = self.total_hashes;
        self.hash_rate = u32::try_from(window).unwrap_or(u32::MAX);
        self.hash_history.push(self.hash_rate);
        self.hash_rate
    }

    /// Moves the synthetic temperature one step
    ///
    /// Running: random walk clamped to [`TEMPERATURE_RANGE`]. Stopped: cools
    /// by one degree toward [`TEMPERATURE_FLOOR`].
    pub fn step_temperature(&mut self, rng: &dyn RandomSource) {
        if self.running {
            let (low, high) = TEMPERATURE_RANGE;
            let step = rng.between(0, TEMPERATURE_STEP * 2) as i32 - TEMPERATURE_STEP as i32;
            self.temperature = (self.temperature + step).clamp(low, high);
        } else if self.temperature > TEMPERATURE_FLOOR {
            self.temperature -= 1;
        }
    }

    /// True once a stopped device has nothing left to cool
    pub fn is_cool(&self) -> bool {
        !self.running && self.temperature <= TEMPERATURE_FLOOR
    }

    /// Time spent in the current run, frozen at stop
    pub fn uptime(&self, now: Instant) -> Duration {
        match (self.started_at, self.stopped_at) {
            (Some(start), Some(stop)) => stop.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Uptime rendered as `HH:MM:SS`
    pub fn uptime_formatted(&self, now: Instant) -> String {
        format_uptime(self.uptime(now).as_secs())
    }

    /// Share efficiency, `"100%"` before any share
    pub fn efficiency(&self) -> String {
        format_efficiency(self.accepted_shares, self.rejected_shares)
    }

    /// Normalized hash-rate history, same length as the history
    pub fn sparkline(&self) -> Sparkline<'_> {
        Sparkline::new(self.hash_history.iter())
    }

    /// Whether a run is active
    pub fn running(&self) -> bool {
        self.running
    }

    /// Identifier of the latest run
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Hashes since the current run started
    pub fn total_hashes(&self) -> u64 {
        self.total_hashes
    }

    /// Hashes in the last completed window
    pub fn hash_rate(&self) -> u32 {
        self.hash_rate
    }

    /// Accepted shares this run
    pub fn accepted_shares(&self) -> u32 {
        self.accepted_shares
    }

    /// Rejected shares this run
    pub fn rejected_shares(&self) -> u32 {
        self.rejected_shares
    }

    /// Synthetic temperature in Celsius
    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    /// Recent shares, oldest first
    pub fn share_log(&self) -> &BoundedLog<ShareEvent> {
        &self.share_log
    }

    /// Recent hash-rate samples, oldest first
    pub fn hash_history(&self) -> &BoundedLog<u32> {
        &self.hash_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::entropy::ScriptedRandom;

    fn share(n: u32, accepted: bool) -> ShareEvent {
        ShareEvent {
            time: format!("00:00:{:02}", n),
            difficulty: 1000 + n,
            accepted,
        }
    }

    #[test]
    fn forced_windows_feed_history_and_sparkline() {
        let mut state = MiningState::new();
        state.begin_run(Instant::now()).unwrap();

        for count in [100, 150, 120] {
            state.record_hashes(count);
            state.complete_window();
        }

        assert_eq!(state.hash_history().to_vec(), vec![100, 150, 120]);
        assert_eq!(state.hash_rate(), 120);
        assert_eq!(state.total_hashes(), 370);
        assert_eq!(state.sparkline().collect::<Vec<_>>(), vec![67, 100, 80]);
    }

    #[test]
    fn history_and_share_log_evict_oldest_first() {
        let mut state = MiningState::new();
        state.begin_run(Instant::now()).unwrap();

        for i in 0..40u64 {
            state.record_hashes(i);
            state.complete_window();
        }
        let history = state.hash_history().to_vec();
        assert_eq!(history.len(), HASH_HISTORY_CAPACITY);
        assert_eq!(history.first(), Some(&10));
        assert_eq!(history.last(), Some(&39));
        assert_eq!(state.sparkline().len(), HASH_HISTORY_CAPACITY);

        for n in 0..8 {
            state.record_share(share(n, true));
        }
        let log = state.share_log().to_vec();
        assert_eq!(log.len(), SHARE_LOG_CAPACITY);
        assert_eq!(log[0].difficulty, 1003);
        assert_eq!(log[4].difficulty, 1007);
        assert_eq!(state.accepted_shares(), 8);
    }

    #[test]
    fn second_begin_run_is_a_no_op() {
        let mut state = MiningState::new();
        let first = state.begin_run(Instant::now());
        state.record_hashes(42);
        assert_eq!(state.begin_run(Instant::now()), None);
        assert_eq!(state.total_hashes(), 42);
        assert_eq!(first, Some(1));
    }

    #[test]
    fn restart_resets_counters_and_buffers() {
        let mut state = MiningState::new();
        let now = Instant::now();
        state.begin_run(now);
        state.record_hashes(10);
        state.complete_window();
        state.record_share(share(1, false));
        assert!(state.end_run(now));
        assert_eq!(state.hash_rate(), 0);

        assert_eq!(state.begin_run(now), Some(2));
        assert_eq!(state.total_hashes(), 0);
        assert_eq!(state.rejected_shares(), 0);
        assert!(state.hash_history().is_empty());
        assert!(state.share_log().is_empty());
        assert_eq!(state.efficiency(), "100%");
    }

    #[test]
    fn efficiency_tracks_rejections() {
        let mut state = MiningState::new();
        state.begin_run(Instant::now());
        state.record_share(share(1, true));
        state.record_share(share(2, true));
        state.record_share(share(3, false));
        assert_eq!(state.efficiency(), "66.7%");
    }

    #[test]
    fn temperature_walks_within_band_then_cools_to_floor() {
        let rng = ScriptedRandom::new(Vec::new(), vec![4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4]);
        let mut state = MiningState::new();
        let now = Instant::now();
        state.begin_run(now);
        for _ in 0..12 {
            state.step_temperature(&rng);
        }
        assert_eq!(state.temperature(), 60);

        let down = ScriptedRandom::new(Vec::new(), vec![0]);
        for _ in 0..30 {
            state.step_temperature(&down);
        }
        assert_eq!(state.temperature(), 40);

        state.end_run(now);
        for _ in 0..3 {
            state.step_temperature(&down);
        }
        assert_eq!(state.temperature(), 37);
        assert!(!state.is_cool());
        for _ in 0..10 {
            state.step_temperature(&down);
        }
        assert_eq!(state.temperature(), TEMPERATURE_FLOOR);
        assert!(state.is_cool());
    }

    #[test]
    fn uptime_freezes_after_stop() {
        let mut state = MiningState::new();
        let start = Instant::now();
        assert_eq!(state.uptime(start), Duration::ZERO);

        state.begin_run(start);
        let later = start + Duration::from_secs(3_725);
        assert_eq!(state.uptime_formatted(later), "01:02:05");

        state.end_run(later);
        assert_eq!(state.uptime(later + Duration::from_secs(600)).as_secs(), 3_725);
    }
}
