//! Rate client for a Frankfurter-compatible quote service.
//!
//! Every fetch validates its input before touching the network or the
//! cache, consults the [`ResponseCache`] by fingerprint, and only caches a
//! payload that passed [`validate_payload`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{Fingerprint, ResponseCache};
use crate::domain::{parse_symbols, CurrencyCode, DateRange, RateDate};
use crate::http_client::{HttpClient, HttpRequest};
use crate::payload::validate_payload;
use crate::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://api.frankfurter.dev";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const LATEST_ENDPOINT: &str = "/v1/latest";

/// Normalized base currency plus at least one quote symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    base: CurrencyCode,
    symbols: Vec<CurrencyCode>,
}

impl RateQuery {
    pub fn new<S: AsRef<str>>(base: &str, symbols: &[S]) -> Result<Self, FetchError> {
        Ok(Self {
            base: CurrencyCode::parse(base)?,
            symbols: parse_symbols(symbols)?,
        })
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn symbols(&self) -> &[CurrencyCode] {
        &self.symbols
    }

    /// Query parameters sent upstream: `base` and comma-joined `symbols`.
    pub fn params(&self) -> [(&'static str, String); 2] {
        let symbols = self
            .symbols
            .iter()
            .map(CurrencyCode::as_str)
            .collect::<Vec<_>>()
            .join(",");
        [("base", self.base.to_string()), ("symbols", symbols)]
    }
}

/// Fetches validated rate payloads, going through the response cache.
#[derive(Clone)]
pub struct RateClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
    cache: ResponseCache,
    timeout: Duration,
}

impl RateClient {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>, cache: ResponseCache) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
            cache,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Latest published rates for `base` against `symbols`.
    pub async fn fetch_latest<S: AsRef<str>>(
        &self,
        base: &str,
        symbols: &[S],
    ) -> Result<Value, FetchError> {
        let query = RateQuery::new(base, symbols)?;
        self.get_json(LATEST_ENDPOINT, &query).await
    }

    /// Daily rates for every business day in `start..=end`.
    pub async fn fetch_timeseries<S: AsRef<str>>(
        &self,
        start: RateDate,
        end: RateDate,
        base: &str,
        symbols: &[S],
    ) -> Result<Value, FetchError> {
        let range = DateRange::new(start, end)?;
        let query = RateQuery::new(base, symbols)?;
        self.get_json(&range.endpoint(), &query).await
    }

    async fn get_json(&self, endpoint: &str, query: &RateQuery) -> Result<Value, FetchError> {
        let params = query.params();
        let fingerprint = Fingerprint::compute(endpoint, params.clone())?;
        if let Some(cached) = self.cache.get(&fingerprint)? {
            return Ok(cached);
        }

        let request = params.into_iter().fold(
            HttpRequest::get(format!("{}{endpoint}", self.base_url))
                .with_timeout_ms(duration_millis(self.timeout)),
            |request, (name, value)| request.with_query(name, value),
        );
        let url = request.full_url();
        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(FetchError::Transport(format!(
                "GET {url} returned status {}",
                response.status
            )));
        }

        let payload: Value = serde_json::from_str(&response.body).map_err(|error| {
            FetchError::Transport(format!("GET {url} returned a non-JSON body: {error}"))
        })?;
        validate_payload(&payload)?;

        self.cache.put(&fingerprint, &payload)?;
        Ok(payload)
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheMode;
    use crate::http_client::{HttpError, HttpResponse, StaticHttpClient};
    use crate::{PayloadError, ValidationError};
    use tempfile::tempdir;

    const LATEST_BODY: &str =
        r#"{"amount":1.0,"base":"USD","date":"2026-02-10","rates":{"BRL":5.12,"EUR":0.93}}"#;

    fn client_with(http: StaticHttpClient, cache: ResponseCache) -> RateClient {
        RateClient::new("https://api.example.test/", Arc::new(http), cache)
    }

    #[tokio::test]
    async fn latest_builds_normalized_request() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::json(LATEST_BODY);
        let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
        let client = client_with(http.clone(), cache);

        let payload = client
            .fetch_latest(" usd", &["brl", " ", "Eur "])
            .await
            .expect("fetch");

        assert_eq!(payload["base"], "USD");
        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.example.test/v1/latest");
        assert_eq!(
            requests[0].query,
            vec![
                (String::from("base"), String::from("USD")),
                (String::from("symbols"), String::from("BRL,EUR")),
            ]
        );
        assert_eq!(requests[0].timeout_ms, 20_000);
    }

    #[tokio::test]
    async fn timeseries_uses_range_endpoint() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::json(r#"{"base":"USD","rates":{}}"#);
        let cache = ResponseCache::open(temp.path(), CacheMode::Bypass).expect("cache");
        let client = client_with(http.clone(), cache).with_timeout(Duration::from_secs(5));

        let start = RateDate::parse("2026-02-01").expect("start");
        let end = RateDate::parse("2026-02-10").expect("end");
        client
            .fetch_timeseries(start, end, "USD", &["BRL"])
            .await
            .expect("fetch");

        let requests = http.requests();
        assert_eq!(
            requests[0].url,
            "https://api.example.test/v1/2026-02-01..2026-02-10"
        );
        assert_eq!(requests[0].timeout_ms, 5_000);
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::json(LATEST_BODY);
        let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
        let client = client_with(http.clone(), cache);

        let first = client.fetch_latest("USD", &["BRL", "EUR"]).await.expect("first");
        let second = client.fetch_latest("usd", &["BRL", "EUR"]).await.expect("second");

        assert_eq!(first, second);
        assert_eq!(http.request_count(), 1);
    }

    #[tokio::test]
    async fn blank_symbols_fail_before_network() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::json(LATEST_BODY);
        let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
        let client = client_with(http.clone(), cache);

        let error = client
            .fetch_latest("USD", &[" ", ""])
            .await
            .expect_err("no symbols");

        assert!(matches!(
            error,
            FetchError::Validation(ValidationError::EmptySymbols)
        ));
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn inverted_range_fails_before_network() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::json(LATEST_BODY);
        let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
        let client = client_with(http.clone(), cache);

        let start = RateDate::parse("2026-02-10").expect("start");
        let end = RateDate::parse("2026-02-01").expect("end");
        let error = client
            .fetch_timeseries(start, end, "USD", &["BRL"])
            .await
            .expect_err("inverted");

        assert!(matches!(
            error,
            FetchError::Validation(ValidationError::InvertedRange { .. })
        ));
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn error_status_is_a_transport_failure() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::new(HttpResponse {
            status: 503,
            body: String::from("unavailable"),
        });
        let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
        let client = client_with(http, cache);

        let error = client
            .fetch_latest("USD", &["BRL"])
            .await
            .expect_err("503");

        let FetchError::Transport(message) = error else {
            panic!("expected a transport error");
        };
        assert!(message.contains("503"));
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_failure() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::failing(HttpError::new("connection failed: refused"));
        let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
        let client = client_with(http, cache);

        let error = client
            .fetch_latest("USD", &["BRL"])
            .await
            .expect_err("refused");

        assert!(matches!(error, FetchError::Transport(message) if message.contains("refused")));
    }

    #[tokio::test]
    async fn non_json_body_is_a_transport_failure() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::json("<html>gateway</html>");
        let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
        let client = client_with(http, cache);

        let error = client
            .fetch_latest("USD", &["BRL"])
            .await
            .expect_err("html");

        assert!(matches!(error, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn invalid_payload_is_not_cached() {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::json(r#"{"base":"USD","rates":[1,2]}"#);
        let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
        let client = client_with(http.clone(), cache.clone());

        for _ in 0..2 {
            let error = client
                .fetch_latest("USD", &["BRL"])
                .await
                .expect_err("invalid");
            assert!(matches!(
                error,
                FetchError::Payload(PayloadError::InvalidPayload { .. })
            ));
        }

        assert_eq!(http.request_count(), 2);
        let query = RateQuery::new("USD", &["BRL"]).expect("query");
        let key = Fingerprint::compute(LATEST_ENDPOINT, query.params()).expect("key");
        assert!(!cache.entry_path(&key).exists());
    }
}
