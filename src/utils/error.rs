// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the simulator application
///
/// This enum represents the error conditions that can surface outside the
/// engine: configuration, I/O, serialization and runtime setup. The engine
/// itself never returns errors, and network failures stay inside the fetcher
/// as [`FetchError`].
#[derive(Error, Debug)]
pub enum MinerError {
    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Missing or unusable async runtime
    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// Async task execution errors
    #[error("Task execution error: {0}")]
    TaskError(String),
}

/// Failure of a single network sub-fetch
///
/// Every variant is non-fatal: the fetcher logs it and keeps the last good
/// value. The type is `Clone` so scripted transports can replay failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection refused, DNS failure or any other transport problem
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Endpoint answered with a non-2xx status
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// Body could not be parsed into the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Request did not complete within the configured bound
    #[error("request timed out")]
    Timeout,
}

/// Classifies reqwest failures into the fetch taxonomy
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::UnexpectedStatus(status.as_u16())
        } else if e.is_decode() {
            FetchError::MalformedResponse(e.to_string())
        } else {
            FetchError::NetworkUnavailable(e.to_string())
        }
    }
}

/// Converts TOML parse errors into MinerError
///
/// Used when the configuration file exists but cannot be parsed.
impl From<toml::de::Error> for MinerError {
    fn from(e: toml::de::Error) -> Self {
        MinerError::ConfigError(format!("Invalid config format: {}", e))
    }
}

/// Converts async task join errors into MinerError
///
/// Used when the reporter or another background task panics or is
/// aborted. Wraps the original error in a `TaskError` variant.
impl From<tokio::task::JoinError> for MinerError {
    fn from(e: tokio::task::JoinError) -> Self {
        MinerError::TaskError(format!("Async task failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_become_config_errors() {
        let err: MinerError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, MinerError::ConfigError(msg) if msg.starts_with("Invalid config format")));
    }

    #[test]
    fn fetch_errors_render_readably() {
        assert_eq!(
            FetchError::UnexpectedStatus(500).to_string(),
            "unexpected HTTP status 500"
        );
        assert_eq!(FetchError::Timeout.to_string(), "request timed out");
    }
}
