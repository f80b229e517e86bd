// src/network/fetcher.rs
//! Rate-limited mirror of external price and blockchain data
//!
//! The fetcher follows a last-known-good policy: a failed sub-fetch is
//! logged and leaves the previous value in place. Nothing in here ever
//! propagates a network error to the rest of the system.

use super::transport::Transport;
use crate::miner::entropy::Clock;
use crate::utils::error::FetchError;
use crate::utils::format::{format_difficulty, format_hashrate, implied_network_hashrate};
use arc_swap::ArcSwap;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Endpoints and timing of the network data refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Price endpoint returning `{"bitcoin": {"usd": <f64>}}`
    #[serde(default = "default_price_url")]
    pub price_url: String,

    /// Plain-text block height endpoint
    #[serde(default = "default_block_height_url")]
    pub block_height_url: String,

    /// Plain-text difficulty endpoint
    #[serde(default = "default_difficulty_url")]
    pub difficulty_url: String,

    /// Minimum seconds between two successful refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// How often the refresh task checks whether a refresh is due
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound for a single request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_price_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd".into()
}

fn default_block_height_url() -> String {
    "https://blockchain.info/q/getblockcount".into()
}

fn default_difficulty_url() -> String {
    "https://blockchain.info/q/getdifficulty".into()
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            price_url: default_price_url(),
            block_height_url: default_block_height_url(),
            difficulty_url: default_difficulty_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl NetworkConfig {
    /// Minimum spacing of successful refreshes
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Spacing of gate checks by the refresh task
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Upper bound for a single request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Last known network data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    /// BTC price in USD
    pub btc_price_usd: f64,
    /// Current block height
    pub block_height: u64,
    /// Difficulty with magnitude suffix
    pub difficulty: String,
    /// Implied network hashrate with unit
    pub network_hashrate: String,
    /// Wall-clock time of the last successful refresh
    pub updated_at: Option<DateTime<Local>>,
}

impl Default for NetworkSnapshot {
    fn default() -> Self {
        NetworkSnapshot {
            btc_price_usd: 0.0,
            block_height: 0,
            difficulty: "0".into(),
            network_hashrate: "0 H/s".into(),
            updated_at: None,
        }
    }
}

#[derive(Deserialize)]
struct PriceResponse {
    bitcoin: CoinPrice,
}

#[derive(Deserialize)]
struct CoinPrice {
    usd: f64,
}

/// Keeps a [`NetworkSnapshot`] fresh without hammering the data sources
pub struct NetworkFetcher {
    config: NetworkConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    snapshot: ArcSwap<NetworkSnapshot>,
    last_update: parking_lot::Mutex<Option<Instant>>,
    cycle: tokio::sync::Mutex<()>,
}

impl NetworkFetcher {
    /// Creates a fetcher whose first refresh is immediately due
    pub fn new(config: NetworkConfig, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        NetworkFetcher {
            config,
            transport,
            clock,
            snapshot: ArcSwap::from_pointee(NetworkSnapshot::default()),
            last_update: parking_lot::Mutex::new(None),
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    /// Copy of the last known data
    pub fn snapshot(&self) -> NetworkSnapshot {
        (*self.snapshot.load_full()).clone()
    }

    /// Endpoint and timing configuration
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Clears the rate-limit gate so the next refresh runs regardless of age
    pub fn force_refresh(&self) {
        *self.last_update.lock() = None;
    }

    /// True when no successful refresh happened within the refresh interval
    pub fn is_due(&self) -> bool {
        match *self.last_update.lock() {
            None => true,
            Some(at) => {
                self.clock.now().saturating_duration_since(at) > self.config.refresh_interval()
            }
        }
    }

    /// Runs one refresh cycle if the gate allows it
    ///
    /// Cycles are serialized, so a forced refresh that races the periodic one
    /// waits and then usually finds the gate closed again.
    ///
    /// # Returns
    /// `true` iff at least one sub-fetch succeeded in this cycle
    pub async fn refresh_if_due(&self) -> bool {
        let _cycle = self.cycle.lock().await;
        if !self.is_due() {
            return false;
        }

        let (price, chain) = tokio::join!(self.fetch_price(), self.fetch_blockchain_data());
        if let Err(e) = &price {
            log::warn!("Price fetch failed, keeping last value: {}", e);
        }
        if let Err(e) = &chain {
            log::warn!("Blockchain fetch failed, keeping last values: {}", e);
        }

        let updated = price.is_ok() || chain.is_ok();
        if updated {
            *self.last_update.lock() = Some(self.clock.now());
            let now = self.clock.wall_clock();
            self.snapshot.rcu(|current| {
                let mut next = NetworkSnapshot::clone(current);
                next.updated_at = Some(now);
                next
            });
        }
        updated
    }

    /// Fetches and stores the BTC price
    ///
    /// # Errors
    /// Returns the failure and leaves the stored price untouched
    pub async fn fetch_price(&self) -> Result<f64, FetchError> {
        let body = self.get(&self.config.price_url).await?;
        let parsed: PriceResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedResponse(format!("price payload: {}", e)))?;
        let price = parsed.bitcoin.usd;
        if !price.is_finite() {
            return Err(FetchError::MalformedResponse(format!("price {} is not finite", price)));
        }

        self.snapshot.rcu(|current| {
            let mut next = NetworkSnapshot::clone(current);
            next.btc_price_usd = price;
            next
        });
        log::debug!("BTC price updated: ${:.2}", price);
        Ok(price)
    }

    /// Fetches block height and difficulty and derives the network hashrate
    ///
    /// The two values are applied independently. The call succeeds when at
    /// least one of them was stored and fails only when both requests failed.
    pub async fn fetch_blockchain_data(&self) -> Result<(), FetchError> {
        let (height, difficulty) = tokio::join!(self.fetch_block_height(), self.fetch_difficulty());

        if let Ok(height) = height {
            self.snapshot.rcu(|current| {
                let mut next = NetworkSnapshot::clone(current);
                next.block_height = height;
                next
            });
        }
        if let Ok(difficulty) = difficulty {
            let formatted = format_difficulty(difficulty);
            let hashrate = format_hashrate(implied_network_hashrate(difficulty));
            self.snapshot.rcu(|current| {
                let mut next = NetworkSnapshot::clone(current);
                next.difficulty = formatted.clone();
                next.network_hashrate = hashrate.clone();
                next
            });
        }

        match (height, difficulty) {
            (Err(height_err), Err(_)) => Err(height_err),
            (Err(e), Ok(_)) => {
                log::debug!("Block height fetch failed: {}", e);
                Ok(())
            }
            (Ok(_), Err(e)) => {
                log::debug!("Difficulty fetch failed: {}", e);
                Ok(())
            }
            (Ok(_), Ok(_)) => Ok(()),
        }
    }

    async fn fetch_block_height(&self) -> Result<u64, FetchError> {
        let body = self.get(&self.config.block_height_url).await?;
        body.trim()
            .parse::<u64>()
            .map_err(|e| FetchError::MalformedResponse(format!("block height '{}': {}", body.trim(), e)))
    }

    async fn fetch_difficulty(&self) -> Result<f64, FetchError> {
        let body = self.get(&self.config.difficulty_url).await?;
        let difficulty = body
            .trim()
            .parse::<f64>()
            .map_err(|e| FetchError::MalformedResponse(format!("difficulty '{}': {}", body.trim(), e)))?;
        if !difficulty.is_finite() || difficulty < 0.0 {
            return Err(FetchError::MalformedResponse(format!(
                "difficulty {} out of range",
                difficulty
            )));
        }
        Ok(difficulty)
    }

    /// GET with an outer timeout, whatever the transport does internally
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        tokio::time::timeout(self.config.request_timeout(), self.transport.get_text(url))
            .await
            .map_err(|_| FetchError::Timeout)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::entropy::ManualClock;
    use crate::network::transport::ScriptedTransport;

    fn setup() -> (NetworkFetcher, Arc<ScriptedTransport>, Arc<ManualClock>) {
        let transport = Arc::new(ScriptedTransport::new());
        let clock = Arc::new(ManualClock::new());
        let fetcher = NetworkFetcher::new(NetworkConfig::default(), transport.clone(), clock.clone());
        (fetcher, transport, clock)
    }

    fn serve_all(transport: &ScriptedTransport, price: &str, height: &str, difficulty: &str) {
        let config = NetworkConfig::default();
        transport.respond(&config.price_url, Ok(price.into()));
        transport.respond(&config.block_height_url, Ok(height.into()));
        transport.respond(&config.difficulty_url, Ok(difficulty.into()));
    }

    #[tokio::test]
    async fn successful_refresh_fills_every_field() {
        let (fetcher, transport, _clock) = setup();
        serve_all(&transport, r#"{"bitcoin":{"usd":67123.5}}"#, "850000\n", "83148355189239.77");

        assert!(fetcher.refresh_if_due().await);
        let snap = fetcher.snapshot();
        assert_eq!(snap.btc_price_usd, 67123.5);
        assert_eq!(snap.block_height, 850_000);
        assert_eq!(snap.difficulty, "83.15T");
        assert_eq!(snap.network_hashrate, "595.20 EH/s");
        assert!(snap.updated_at.is_some());
    }

    #[tokio::test]
    async fn server_error_keeps_previous_price() {
        let (fetcher, transport, _clock) = setup();
        let config = NetworkConfig::default();
        serve_all(&transport, r#"{"bitcoin":{"usd":50000.0}}"#, "1", "1");
        fetcher.fetch_price().await.unwrap();

        transport.respond(&config.price_url, Err(FetchError::UnexpectedStatus(500)));
        assert_eq!(fetcher.fetch_price().await, Err(FetchError::UnexpectedStatus(500)));
        assert_eq!(fetcher.snapshot().btc_price_usd, 50000.0);
    }

    #[tokio::test]
    async fn malformed_payloads_are_rejected() {
        let (fetcher, transport, _clock) = setup();
        serve_all(&transport, r#"{"ethereum":{"usd":1.0}}"#, "tall", "hard");

        assert!(matches!(fetcher.fetch_price().await, Err(FetchError::MalformedResponse(_))));
        assert!(matches!(
            fetcher.fetch_blockchain_data().await,
            Err(FetchError::MalformedResponse(_))
        ));
        assert!(!fetcher.refresh_if_due().await);
        assert_eq!(fetcher.snapshot(), NetworkSnapshot::default());
    }

    #[tokio::test]
    async fn refresh_is_rate_limited_until_forced() {
        let (fetcher, transport, clock) = setup();
        serve_all(&transport, r#"{"bitcoin":{"usd":1.0}}"#, "2", "3");

        assert!(fetcher.refresh_if_due().await);
        let calls = transport.calls().len();
        assert_eq!(calls, 3);

        clock.advance(Duration::from_secs(30));
        assert!(!fetcher.refresh_if_due().await);
        assert_eq!(transport.calls().len(), calls);

        fetcher.force_refresh();
        assert!(fetcher.refresh_if_due().await);
        assert_eq!(transport.calls().len(), calls * 2);

        clock.advance(Duration::from_secs(61));
        assert!(fetcher.is_due());
    }

    #[tokio::test]
    async fn failed_cycle_leaves_gate_open() {
        let (fetcher, _transport, _clock) = setup();
        assert!(!fetcher.refresh_if_due().await);
        assert!(fetcher.is_due());
        assert!(fetcher.snapshot().updated_at.is_none());
    }

    #[tokio::test]
    async fn partial_blockchain_data_still_counts() {
        let (fetcher, transport, _clock) = setup();
        let config = NetworkConfig::default();
        transport.respond(&config.block_height_url, Ok("840000".into()));
        transport.respond(&config.difficulty_url, Err(FetchError::Timeout));

        assert!(fetcher.fetch_blockchain_data().await.is_ok());
        let snap = fetcher.snapshot();
        assert_eq!(snap.block_height, 840_000);
        assert_eq!(snap.difficulty, "0");
        assert!(fetcher.refresh_if_due().await);
    }

    struct Silent;

    #[async_trait::async_trait]
    impl Transport for Silent {
        async fn get_text(&self, _url: &str) -> Result<String, FetchError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_request_gives_up_after_the_timeout() {
        let fetcher = NetworkFetcher::new(
            NetworkConfig::default(),
            Arc::new(Silent),
            Arc::new(ManualClock::new()),
        );
        let began = tokio::time::Instant::now();

        assert_eq!(fetcher.fetch_price().await, Err(FetchError::Timeout));
        let timeout = fetcher.config().request_timeout();
        assert!(began.elapsed() >= timeout);
        assert!(began.elapsed() < timeout + Duration::from_secs(1));
        assert!(!fetcher.refresh_if_due().await);
        assert!(fetcher.is_due());
    }
}
