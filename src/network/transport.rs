// src/network/transport.rs
//! HTTP access behind a trait
//!
//! The fetcher only needs "GET this URL, give me the body". Keeping that
//! behind [`Transport`] lets tests script responses without a server.

use crate::utils::error::{FetchError, MinerError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
#[cfg(any(test, feature = "test-util"))]
use {parking_lot::Mutex, std::collections::HashMap};

/// Fetches a URL and returns its body as text
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a GET request
    ///
    /// # Errors
    /// Any non-2xx status, transport failure or timeout as a [`FetchError`]
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed transport with a per-request timeout
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, MinerError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("nerdminer-sim/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[cfg(any(test, feature = "test-util"))]
/// Transport answering from a fixed table of responses
///
/// Unknown URLs fail with `NetworkUnavailable`. Responses can be swapped at
/// any time to simulate an endpoint going down or recovering.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, Result<String, FetchError>>>,
    calls: Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-util"))]
impl ScriptedTransport {
    /// Creates a transport with no routes
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response returned for `url`
    pub fn respond(&self, url: &str, response: Result<String, FetchError>) {
        self.responses.lock().insert(url.to_string(), response);
    }

    /// URLs requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().push(url.to_string());
        self.responses
            .lock()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::NetworkUnavailable(format!("no route to {}", url))))
    }
}
