//! Typed failures for each stage. The orchestrator decides which ones are fatal.

use thiserror::Error;

/// A source feed could not be fetched or decoded. Ends that source's stream.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("feed returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("feed decode error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// A single annotation call failed. Logged per comment; never fatal.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("network error: {0}")]
    Network(String),

    #[error("annotation API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("annotation parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AnnotateError {
    fn from(err: reqwest::Error) -> Self {
        AnnotateError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AnnotateError {
    fn from(err: serde_json::Error) -> Self {
        AnnotateError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
