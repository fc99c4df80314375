//! Error type captured into [`QueryState`](super::QueryState) when a fetch fails.
//!
//! There is a single error type for every fetcher: the variants only describe
//! where the failure came from, they do not classify it as retryable or fatal.

use thiserror::Error;

/// A failed fetch. Stored in state, handed to `on_error`, never returned from `query`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, url: String },

    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The item endpoint answered `null` for this id.
    #[error("item {0} not found")]
    Missing(u64),

    /// Any other failure reported by a caller-supplied fetcher.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    pub fn msg(message: impl Into<String>) -> Self {
        FetchError::Other(message.into())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
