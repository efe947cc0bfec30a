//! Error types for fetching, converting and persisting rates.

use thiserror::Error;

/// Failure of a remote rate query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Network or connectivity failure, including non-success HTTP statuses.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The payload could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The provider reported a business error, e.g. an invalid key or rate limit.
    #[error("Provider error {code}: {info}")]
    Provider { code: i64, info: String },
}

impl FetchError {
    /// Only transport failures may succeed when repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Exchange rates are not loaded")]
    RatesNotLoaded,

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] fjall::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode or decode cache entry: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;
