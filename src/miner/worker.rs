// src/miner/worker.rs
//! Hash worker task
//!
//! Each worker hashes throwaway input on a fixed interval, counts the hash
//! and occasionally reports a synthetic share. There is no target: the
//! interval is the only throttle.

use crate::miner::engine::Shared;
use crate::types::ShareEvent;
use sha2::{Digest, Sha256};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Range of the cosmetic difficulty attached to a share
pub const SHARE_DIFFICULTY_RANGE: (u32, u32) = (1000, 10_000);

/// Parameters shared by every worker of one run
#[derive(Debug, Clone, Copy)]
pub struct WorkerParams {
    /// Delay between two hashes
    pub interval: Duration,
    /// Chance that a hash yields a share
    pub share_probability: f64,
    /// Chance that a found share is rejected
    pub reject_ratio: f64,
}

/// One simulated hashing core
pub struct HashWorker {
    id: usize,
    generation: u64,
    shared: Arc<Shared>,
    params: WorkerParams,
}

impl HashWorker {
    /// Creates worker `id` bound to run `generation`
    pub(crate) fn new(id: usize, generation: u64, shared: Arc<Shared>, params: WorkerParams) -> Self {
        HashWorker {
            id,
            generation,
            shared,
            params,
        }
    }

    /// Hashes until the run is cancelled or superseded
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = time::interval(self.params.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::debug!("Worker {} started (run {})", self.id, self.generation);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if !self.hash_once() {
                break;
            }
        }
        log::debug!("Worker {} exited (run {})", self.id, self.generation);
    }

    /// Performs one iteration
    ///
    /// The run check and the counter update happen under the same lock, so a
    /// worker can never count a hash after `stop` has returned.
    ///
    /// # Returns
    /// `false` once the worker's run is no longer current
    pub fn hash_once(&self) -> bool {
        let _ = black_box(self.digest());
        let share = self.roll_share();

        let mut state = self.shared.lock();
        if !state.is_current(self.generation) {
            return false;
        }
        state.record_hash();
        if let Some(share) = share {
            log::debug!(
                "Worker {} found share diff {} ({})",
                self.id,
                share.difficulty,
                if share.accepted { "accepted" } else { "rejected" }
            );
            state.record_share(share);
        }
        true
    }

    fn digest(&self) -> [u8; 32] {
        let input = format!(
            "nerdminer{}{}{}",
            self.id,
            self.shared.clock.wall_clock().timestamp_micros(),
            self.shared.random.between(0, 1_000_000_000)
        );
        Sha256::digest(input.as_bytes()).into()
    }

    fn roll_share(&self) -> Option<ShareEvent> {
        let random = &self.shared.random;
        if !random.chance(self.params.share_probability) {
            return None;
        }
        let (low, high) = SHARE_DIFFICULTY_RANGE;
        Some(ShareEvent {
            time: self.shared.clock.wall_clock().format("%H:%M:%S").to_string(),
            difficulty: random.between(low, high),
            accepted: !random.chance(self.params.reject_ratio),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::entropy::{ManualClock, ScriptedRandom};
    use std::time::Instant;

    fn params() -> WorkerParams {
        WorkerParams {
            interval: Duration::from_millis(1),
            share_probability: 0.001,
            reject_ratio: 0.0,
        }
    }

    fn shared(units: Vec<f64>, integers: Vec<u32>) -> Arc<Shared> {
        Arc::new(Shared::new(
            Arc::new(ManualClock::new()),
            Arc::new(ScriptedRandom::new(units, integers)),
        ))
    }

    #[test]
    fn hash_without_share_only_counts() {
        let shared = shared(vec![0.5], vec![7]);
        let generation = shared.lock().begin_run(Instant::now()).unwrap();
        let worker = HashWorker::new(0, generation, shared.clone(), params());

        for _ in 0..10 {
            assert!(worker.hash_once());
        }
        let state = shared.lock();
        assert_eq!(state.total_hashes(), 10);
        assert_eq!(state.accepted_shares(), 0);
        assert!(state.share_log().is_empty());
    }

    #[test]
    fn lucky_roll_records_a_share() {
        // chance(share) succeeds, chance(reject) fails
        let shared = shared(vec![0.0005, 0.9], vec![123, 4321]);
        let generation = shared.lock().begin_run(Instant::now()).unwrap();
        let worker = HashWorker::new(1, generation, shared.clone(), params());

        assert!(worker.hash_once());
        let state = shared.lock();
        assert_eq!(state.accepted_shares(), 1);
        let log = state.share_log().to_vec();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].difficulty, 4321);
        assert!(log[0].accepted);
        assert_eq!(log[0].time.len(), 8);
    }

    #[test]
    fn rejected_share_counts_against_efficiency() {
        let shared = shared(vec![0.0], vec![5000]);
        let generation = shared.lock().begin_run(Instant::now()).unwrap();
        let worker = HashWorker::new(
            0,
            generation,
            shared.clone(),
            WorkerParams {
                reject_ratio: 1.0,
                ..params()
            },
        );

        assert!(worker.hash_once());
        let state = shared.lock();
        assert_eq!(state.rejected_shares(), 1);
        assert_eq!(state.efficiency(), "0.0%");
    }

    #[test]
    fn stale_worker_stops_counting() {
        let shared = shared(vec![0.5], Vec::new());
        let now = Instant::now();
        let generation = shared.lock().begin_run(now).unwrap();
        let worker = HashWorker::new(0, generation, shared.clone(), params());
        assert!(worker.hash_once());

        shared.lock().end_run(now);
        assert!(!worker.hash_once());

        shared.lock().begin_run(now).unwrap();
        assert!(!worker.hash_once());
        assert_eq!(shared.lock().total_hashes(), 0);
    }
}
