//! Custom error types for the streaming client
//!
//! Only transport-class failures ever cross the run-loop boundary; malformed
//! records, protocol `error` events, and unknown event types are absorbed
//! inside the aggregator.

use thiserror::Error;

/// Top-level streaming client errors
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report I/O error: {0}")]
    Report(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<String> for StreamError {
    fn from(err: String) -> Self {
        StreamError::Config(err)
    }
}

impl From<&str> for StreamError {
    fn from(err: &str) -> Self {
        StreamError::Config(err.to_string())
    }
}
