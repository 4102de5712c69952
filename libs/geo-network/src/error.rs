//! Error types for geo-network

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Network not found: {0}")]
    NotFound(Uuid),

    #[error("Network source unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl NetworkError {
    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Unavailable(_) => true,
            NetworkError::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for NetworkError {
    fn from(err: serde_yaml::Error) -> Self {
        NetworkError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;
