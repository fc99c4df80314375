use thiserror::Error;

use crate::query::FetchError;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to fetch job IDs: {0}")]
    JobIds(FetchError),

    #[error("Failed to fetch job details: {0}")]
    JobDetails(FetchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
