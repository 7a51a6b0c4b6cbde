//! Behavior-driven tests for the response cache as seen through the rate client.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use fxingest_core::{
    CacheMode, Fingerprint, RateClient, RateQuery, ResponseCache, StaticHttpClient,
};
use tempfile::tempdir;

const LATEST_BODY: &str =
    r#"{"amount":1.0,"base":"USD","date":"2026-02-10","rates":{"BRL":5.12,"EUR":0.93}}"#;

fn cache_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read cache dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn when_a_query_repeats_the_cached_payload_is_returned_without_network() {
    // Given: a client with caching enabled
    let temp = tempdir().expect("tempdir");
    let http = StaticHttpClient::json(LATEST_BODY);
    let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
    let client = RateClient::new("https://api.example.test", Arc::new(http.clone()), cache);

    // When: the same logical query is issued with different spelling
    let first = client.fetch_latest("USD", &["BRL", "EUR"]).await.expect("first");
    let second = client
        .fetch_latest(" usd ", &["brl", "", "eur"])
        .await
        .expect("second");

    // Then: only one request reached the network and one file was written
    assert_eq!(first, second);
    assert_eq!(http.request_count(), 1);
    assert_eq!(cache_files(temp.path()).len(), 1);
}

#[tokio::test]
async fn when_the_cache_file_name_is_derived_it_is_the_query_fingerprint() {
    let temp = tempdir().expect("tempdir");
    let http = StaticHttpClient::json(LATEST_BODY);
    let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
    let client = RateClient::new("https://api.example.test", Arc::new(http), cache);

    client.fetch_latest("USD", &["BRL", "EUR"]).await.expect("fetch");

    let query = RateQuery::new("USD", &["BRL", "EUR"]).expect("query");
    let fingerprint = Fingerprint::compute("/v1/latest", query.params()).expect("fingerprint");
    assert_eq!(
        cache_files(temp.path()),
        vec![format!("{}.json", fingerprint.as_str())]
    );
}

#[tokio::test]
async fn when_no_cache_is_requested_every_fetch_hits_the_network() {
    // Given: a cache directory already holding the answer
    let temp = tempdir().expect("tempdir");
    let seeded = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
    let seeding_http = StaticHttpClient::json(LATEST_BODY);
    RateClient::new("https://api.example.test", Arc::new(seeding_http), seeded)
        .fetch_latest("USD", &["BRL", "EUR"])
        .await
        .expect("seed");

    // When: a bypassing client runs the same query twice
    let http = StaticHttpClient::json(LATEST_BODY);
    let bypass = ResponseCache::open(temp.path(), CacheMode::Bypass).expect("bypass");
    let client = RateClient::new("https://api.example.test", Arc::new(http.clone()), bypass);
    client.fetch_latest("USD", &["BRL", "EUR"]).await.expect("first");
    client.fetch_latest("USD", &["BRL", "EUR"]).await.expect("second");

    // Then: both went to the network and no new file appeared
    assert_eq!(http.request_count(), 2);
    assert_eq!(cache_files(temp.path()).len(), 1);
}

#[tokio::test]
async fn when_different_windows_are_fetched_each_gets_its_own_entry() {
    let temp = tempdir().expect("tempdir");
    let http = StaticHttpClient::json(r#"{"base":"USD","rates":{}}"#);
    let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
    let client = RateClient::new("https://api.example.test", Arc::new(http.clone()), cache);

    let day = |value: &str| fxingest_core::RateDate::parse(value).expect("date");
    client
        .fetch_timeseries(day("2026-02-01"), day("2026-02-05"), "USD", &["BRL"])
        .await
        .expect("first window");
    client
        .fetch_timeseries(day("2026-02-06"), day("2026-02-10"), "USD", &["BRL"])
        .await
        .expect("second window");

    assert_eq!(http.request_count(), 2);
    assert_eq!(cache_files(temp.path()).len(), 2);
}

#[tokio::test]
async fn when_upstream_payload_is_invalid_nothing_is_cached() {
    let temp = tempdir().expect("tempdir");
    let http = StaticHttpClient::json(r#"{"base":"USD","rates":"none"}"#);
    let cache = ResponseCache::open(temp.path(), CacheMode::Use).expect("cache");
    let client = RateClient::new("https://api.example.test", Arc::new(http), cache);

    client
        .fetch_latest("USD", &["BRL"])
        .await
        .expect_err("invalid payload");

    assert!(cache_files(temp.path()).is_empty());
}
