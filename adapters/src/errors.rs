//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur while reaching the hosted
//! database, decoding its rows, or configuring an adapter, providing a single
//! error type for every backend interaction.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode backend response: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdapterError::Decode(err.to_string())
        } else {
            AdapterError::Connection(err.to_string())
        }
    }
}
