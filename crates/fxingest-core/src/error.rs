use thiserror::Error;

use crate::http_client::HttpError;

/// Caller input rejected before any I/O happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("base currency cannot be empty")]
    EmptyBase,
    #[error("at least one symbol is required")]
    EmptySymbols,
    #[error("currency code must be ASCII alphanumeric with at most {max} characters: '{value}'")]
    InvalidCurrency { value: String, max: usize },

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
}

/// Upstream data that fails structural or semantic checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: &'static str },
    #[error("snapshot payload has no 'date' field")]
    MalformedSnapshot,
    #[error("series payload entry '{date}' is not an object of symbol rates")]
    MalformedSeries { date: String },
    #[error("payload has no base currency and none was supplied")]
    MissingBase,
    #[error("rate for {symbol} on {date} is not numeric")]
    MalformedRate { date: String, symbol: String },
}

/// Failure of a single rate fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl From<HttpError> for FetchError {
    fn from(error: HttpError) -> Self {
        Self::Transport(error.message().to_owned())
    }
}

/// Errors reading or writing cache artifacts.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("cache entry {fingerprint} is not valid JSON: {source}")]
    Corrupt {
        fingerprint: String,
        source: serde_json::Error,
    },

    #[error("failed to serialize cache key or entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to persist cache entry: {0}")]
    Persist(#[from] tempfile::PersistError),
}
