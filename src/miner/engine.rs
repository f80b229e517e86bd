// src/miner/engine.rs
//! Simulation engine controller
//!
//! Owns the lifecycle of one simulated device. `start` spawns the hash
//! workers, the stats tick and the network refresh on the tokio runtime;
//! `stop` flips the state and cancels them. Consumers on any thread read
//! through [`Engine::snapshot`], which copies everything under one lock.

use crate::config::{Config, DisplayConfig, SimulationConfig};
use crate::miner::entropy::{Clock, RandomSource, SystemClock, ThreadRandom};
use crate::miner::worker::{HashWorker, WorkerParams};
use crate::network::{HttpTransport, NetworkConfig, NetworkFetcher, NetworkSnapshot, Transport};
use crate::stats::MiningState;
use crate::types::{EngineStatus, Snapshot};
use crate::utils::error::MinerError;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Longest any task may wait for the mining state lock
const LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// External collaborators the engine depends on
#[derive(Clone)]
pub struct Sources {
    /// HTTP access for the network fetcher
    pub transport: Arc<dyn Transport>,
    /// Monotonic and wall-clock time
    pub clock: Arc<dyn Clock>,
    /// Randomness for hashing input, shares and temperature
    pub random: Arc<dyn RandomSource>,
}

impl Sources {
    /// Real HTTP, real time and thread-local randomness
    pub fn system(network: &NetworkConfig) -> Result<Self, MinerError> {
        Ok(Sources {
            transport: Arc::new(HttpTransport::new(network.request_timeout())?),
            clock: Arc::new(SystemClock),
            random: Arc::new(ThreadRandom),
        })
    }
}

/// State touched by every simulation task
pub(crate) struct Shared {
    state: Mutex<MiningState>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) random: Arc<dyn RandomSource>,
}

impl Shared {
    pub(crate) fn new(clock: Arc<dyn Clock>, random: Arc<dyn RandomSource>) -> Self {
        Shared {
            state: Mutex::new(MiningState::new()),
            clock,
            random,
        }
    }

    /// Acquires the mining state lock
    ///
    /// Critical sections are a handful of counter updates, so missing the
    /// deadline means a task is stuck while holding the lock. That is fatal
    /// for the whole process, not just the calling task, so it aborts.
    pub(crate) fn lock(&self) -> MutexGuard<'_, MiningState> {
        match self.acquire(LOCK_TIMEOUT) {
            Ok(guard) => guard,
            Err(e) => {
                log::error!("Invariant violation: {}", e);
                std::process::abort();
            }
        }
    }

    /// Waits at most `timeout` for the mining state lock
    ///
    /// # Errors
    /// `RuntimeError` naming the deadline when the lock stays held
    pub(crate) fn acquire(&self, timeout: Duration) -> Result<MutexGuard<'_, MiningState>, MinerError> {
        self.state.try_lock_for(timeout).ok_or_else(|| {
            MinerError::RuntimeError(format!(
                "mining state lock not acquired within {:?}; a holder is stuck",
                timeout
            ))
        })
    }
}

struct EngineInner {
    simulation: SimulationConfig,
    display: DisplayConfig,
    shared: Arc<Shared>,
    network: Arc<NetworkFetcher>,
    refresh_wakeup: Arc<Notify>,
    /// Cancellation token of the active run; also serializes start/stop
    lifecycle: Mutex<Option<CancellationToken>>,
    runtime: Handle,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        if let Some(token) = self.lifecycle.get_mut().take() {
            token.cancel();
        }
    }
}

/// Handle to one simulated mining device
///
/// Cheap to clone; every clone controls the same device. All methods except
/// [`Engine::refresh_network`] are synchronous and may be called from any
/// thread, including threads outside the tokio runtime.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Creates an engine with real collaborators on the current runtime
    ///
    /// # Errors
    /// `RuntimeError` when called outside a tokio runtime, `HttpError` when
    /// the HTTP client cannot be built
    pub fn new(config: Config) -> Result<Self, MinerError> {
        let runtime = Handle::try_current()
            .map_err(|e| MinerError::RuntimeError(format!("no tokio runtime: {}", e)))?;
        let sources = Sources::system(&config.network)?;
        Ok(Self::with_sources(config, sources, runtime))
    }

    /// Creates an engine with explicit collaborators and runtime
    pub fn with_sources(config: Config, sources: Sources, runtime: Handle) -> Self {
        let shared = Arc::new(Shared::new(sources.clock.clone(), sources.random));
        let network = Arc::new(NetworkFetcher::new(
            config.network,
            sources.transport,
            sources.clock,
        ));

        Engine {
            inner: Arc::new(EngineInner {
                simulation: config.simulation,
                display: config.display,
                shared,
                network,
                refresh_wakeup: Arc::new(Notify::new()),
                lifecycle: Mutex::new(None),
                runtime,
            }),
        }
    }

    /// Starts a new run
    ///
    /// Resets counters and buffers and spawns the run's tasks. Calling it on
    /// a running engine changes nothing.
    ///
    /// # Returns
    /// `true` if this call performed the Stopped -> Running transition
    pub fn start(&self) -> bool {
        let inner = &self.inner;
        let mut lifecycle = inner.lifecycle.lock();

        let generation = match inner.shared.lock().begin_run(inner.shared.clock.now()) {
            Some(generation) => generation,
            None => return false,
        };

        let shutdown = CancellationToken::new();
        let params = WorkerParams {
            interval: inner.simulation.hash_interval(),
            share_probability: inner.simulation.share_probability,
            reject_ratio: inner.simulation.reject_ratio,
        };
        for id in 0..inner.simulation.workers {
            let worker = HashWorker::new(id, generation, inner.shared.clone(), params);
            inner.runtime.spawn(worker.run(shutdown.clone()));
        }
        inner.runtime.spawn(run_stats(
            inner.shared.clone(),
            generation,
            inner.simulation.stats_interval(),
            shutdown.clone(),
        ));
        inner.runtime.spawn(run_network_refresh(
            inner.network.clone(),
            inner.refresh_wakeup.clone(),
            shutdown.clone(),
        ));

        *lifecycle = Some(shutdown);
        log::info!(
            "Simulation started with {} workers (run {})",
            inner.simulation.workers,
            generation
        );
        true
    }

    /// Stops the active run
    ///
    /// Returns immediately; tasks wind down on their own. `hash_rate` reads
    /// as 0 from this point on.
    ///
    /// # Returns
    /// `true` if this call performed the Running -> Stopped transition
    pub fn stop(&self) -> bool {
        let inner = &self.inner;
        let mut lifecycle = inner.lifecycle.lock();

        let stopped = inner.shared.lock().end_run(inner.shared.clock.now());
        if let Some(token) = lifecycle.take() {
            token.cancel();
        }
        if stopped {
            log::info!("Simulation stopped");
        }
        stopped
    }

    /// Current lifecycle state
    pub fn status(&self) -> EngineStatus {
        if self.inner.shared.lock().running() {
            EngineStatus::Running
        } else {
            EngineStatus::Stopped
        }
    }

    /// Shorthand for `status() == Running`
    pub fn is_running(&self) -> bool {
        self.status() == EngineStatus::Running
    }

    /// Consistent copy of all observable state
    pub fn snapshot(&self) -> Snapshot {
        let inner = &self.inner;
        let network = inner.network.snapshot();
        let now = inner.shared.clock.now();
        let state = inner.shared.lock();

        let running = state.running();
        Snapshot {
            status: if running {
                EngineStatus::Running
            } else {
                EngineStatus::Stopped
            },
            running,
            hash_rate: state.hash_rate(),
            total_hashes: state.total_hashes(),
            accepted_shares: state.accepted_shares(),
            rejected_shares: state.rejected_shares(),
            uptime: state.uptime_formatted(now),
            uptime_secs: state.uptime(now).as_secs(),
            efficiency: state.efficiency(),
            temperature: state.temperature(),
            sparkline: state.sparkline().collect(),
            recent_shares: state.share_log().to_vec(),
            block_height: network.block_height,
            btc_price_usd: network.btc_price_usd,
            difficulty: network.difficulty,
            network_hashrate: network.network_hashrate,
            network_updated_at: network.updated_at,
            pool: inner.display.pool.clone(),
            worker: inner.display.worker.clone(),
        }
    }

    /// Last known network data
    pub fn network(&self) -> NetworkSnapshot {
        self.inner.network.snapshot()
    }

    /// Opens the rate-limit gate and wakes the refresh task
    ///
    /// While stopped there is no refresh task; the next
    /// [`Engine::refresh_network`] or `start` picks the request up.
    pub fn force_network_refresh(&self) {
        self.inner.network.force_refresh();
        self.inner.refresh_wakeup.notify_one();
    }

    /// Runs a refresh cycle now if one is due
    ///
    /// # Returns
    /// `true` iff at least one sub-fetch succeeded, i.e. a repaint is useful
    pub async fn refresh_network(&self) -> bool {
        self.inner.network.refresh_if_due().await
    }
}

/// Stats tick of one run
///
/// While the run is current, each tick closes a hash-rate window and steps
/// the temperature. After the run ends the task keeps ticking to cool the
/// device down, and exits once it is cool or a newer run has started.
async fn run_stats(
    shared: Arc<Shared>,
    generation: u64,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let mut state = shared.lock();
                if !state.is_current(generation) {
                    break;
                }
                let rate = state.complete_window();
                state.step_temperature(shared.random.as_ref());
                log::debug!(
                    "Tick: {} H/s, total {}, {}°C",
                    rate,
                    state.total_hashes(),
                    state.temperature()
                );
            }
        }
    }

    loop {
        ticker.tick().await;
        let mut state = shared.lock();
        if state.generation() != generation || state.is_cool() {
            break;
        }
        state.step_temperature(shared.random.as_ref());
    }
}

/// Network refresh task of one run
///
/// Checks the rate-limit gate every poll interval, or immediately when
/// woken by a forced refresh. An in-flight refresh is abandoned on stop.
async fn run_network_refresh(
    network: Arc<NetworkFetcher>,
    wakeup: Arc<Notify>,
    shutdown: CancellationToken,
) {
    let mut ticker = time::interval(network.config().poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
            _ = wakeup.notified() => {}
        }
        tokio::select! {
            _ = shutdown.cancelled() => break,
            updated = network.refresh_if_due() => {
                if updated {
                    let data = network.snapshot();
                    log::info!(
                        "Network data updated: block {} | BTC ${:.0} | diff {} | net {}",
                        data.block_height,
                        data.btc_price_usd,
                        data.difficulty,
                        data.network_hashrate
                    );
                }
            }
        }
    }
}
