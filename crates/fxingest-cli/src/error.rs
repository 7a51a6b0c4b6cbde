use fxingest_core::{CacheError, FetchError, PayloadError, ValidationError, WarehouseError};
use thiserror::Error;

/// Failures surfaced by an ingest invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit status; every failure exits with 1.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_)
            | Self::Validation(_)
            | Self::Fetch(_)
            | Self::Payload(_)
            | Self::Cache(_)
            | Self::Warehouse(_)
            | Self::Io(_) => 1,
        }
    }
}
