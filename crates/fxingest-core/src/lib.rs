//! # fx-ingest Core
//!
//! Fetching, caching and normalizing FX rate payloads.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Content-addressed response cache |
//! | [`client`] | Rate client for `/v1/latest` and `/v1/{start}..{end}` |
//! | [`domain`] | Currency codes, dates and UTC timestamps |
//! | [`error`] | Validation, payload, fetch and cache errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Payload to [`RateRow`] conversion |
//! | [`payload`] | Payload validation and shape detection |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fxingest_core::{
//!     normalize_payload, CacheMode, CurrencyCode, NormalizeOptions, RateClient,
//!     ReqwestHttpClient, ResponseCache, Warehouse, WarehouseConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = ResponseCache::open(".cache/http", CacheMode::Use)?;
//!     let client = RateClient::new(
//!         "https://api.frankfurter.dev",
//!         Arc::new(ReqwestHttpClient::new()),
//!         cache,
//!     );
//!
//!     let payload = client.fetch_latest("USD", &["BRL", "EUR"]).await?;
//!     let options = NormalizeOptions::default().with_base(CurrencyCode::parse("USD")?);
//!     let rows = normalize_payload(&payload, &options)?;
//!
//!     let warehouse = Warehouse::open(WarehouseConfig::default())?;
//!     println!("upserted {} rows", warehouse.upsert_rates(&rows)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Data flow
//!
//! ```text
//! RateClient ──▶ ResponseCache (hit?) ──▶ HttpClient ──▶ validate_payload
//!                                                             │
//!                                                             ▼
//!                       Warehouse::upsert_rates ◀── normalize_payload
//! ```

pub mod cache;
pub mod client;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod payload;

pub use cache::{CacheMode, Fingerprint, ResponseCache};
pub use client::{RateClient, RateQuery, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use domain::{parse_symbol_list, parse_symbols, CurrencyCode, DateRange, RateDate, UtcDateTime};
pub use error::{CacheError, FetchError, PayloadError, ValidationError};
pub use fxingest_warehouse::{
    canonical_json, IngestRun, RateRow, RunId, RunOutcome, RunStatus, StoredRate, Warehouse,
    WarehouseConfig, WarehouseError,
};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StaticHttpClient,
};
pub use normalize::{normalize_payload, NormalizeOptions, DEFAULT_SOURCE};
pub use payload::{validate_payload, RatePayload, SeriesPoint};
