mod backfill;
mod daily;

use std::sync::Arc;

use fxingest_core::{
    normalize_payload, CacheMode, CurrencyCode, HttpClient, NormalizeOptions, RateClient, RateDate,
    ResponseCache, RunId, RunOutcome, Warehouse, WarehouseConfig, WarehouseError,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::cli::Command;
use crate::config::Settings;
use crate::error::CliError;

const MAX_POOL_SIZE: usize = 2;

/// Result of a successful ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub run_id: RunId,
    pub rows: usize,
}

pub async fn run(
    command: &Command,
    settings: &Settings,
    http: Arc<dyn HttpClient>,
) -> Result<IngestReport, CliError> {
    match command {
        Command::Backfill(args) => backfill::run(args, settings, http).await,
        Command::Daily(args) => daily::run(args, settings, http).await,
    }
}

/// Which upstream query a job issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchWindow {
    Latest,
    Range { start: RateDate, end: RateDate },
}

/// One ingest invocation: what to fetch and how to record it.
#[derive(Debug, Clone)]
struct IngestJob<'a> {
    command: &'static str,
    window: FetchWindow,
    base: &'a str,
    symbols: &'a [CurrencyCode],
    cache_mode: CacheMode,
}

impl IngestJob<'_> {
    /// Invocation parameters as stored on the run record.
    fn args_snapshot(&self) -> Value {
        let mut args = json!({
            "base": self.base,
            "symbols": self.symbols,
            "use_cache": self.cache_mode.is_enabled(),
        });
        if let FetchWindow::Range { start, end } = self.window {
            args["start"] = json!(start.to_string());
            args["end"] = json!(end.to_string());
        }
        args
    }
}

/// Record a run, fetch, normalize and store, then close the run as OK or FAIL.
async fn execute(
    job: IngestJob<'_>,
    settings: &Settings,
    http: Arc<dyn HttpClient>,
) -> Result<IngestReport, CliError> {
    let warehouse = Warehouse::open(WarehouseConfig {
        db_path: settings.db_path.clone(),
        max_pool_size: MAX_POOL_SIZE,
    })?;
    let run_id = warehouse.start_run(job.command, &job.args_snapshot())?;
    info!(%run_id, command = job.command, base = job.base, "ingest run started");

    let attempt = fetch_and_store(&job, &warehouse, settings, http).await;
    close_run(job.command, run_id, attempt, |id, outcome| {
        warehouse.finish_run(id, outcome)
    })
}

/// Record the terminal status of a started run.
///
/// Failing to record OK fails the run, which is then recorded as FAIL.
fn close_run(
    command: &str,
    run_id: RunId,
    attempt: Result<usize, CliError>,
    mut finish: impl FnMut(RunId, RunOutcome) -> Result<(), WarehouseError>,
) -> Result<IngestReport, CliError> {
    let failure = match attempt {
        Ok(rows) => match finish(run_id, RunOutcome::ok(rows as u64)) {
            Ok(()) => return Ok(IngestReport { run_id, rows }),
            Err(finish_error) => CliError::from(finish_error),
        },
        Err(failure) => failure,
    };

    let message = failure.to_string();
    if let Err(finish_error) = finish(run_id, RunOutcome::fail(&message)) {
        error!(%run_id, error = %finish_error, "failed to record run outcome");
    }
    error!(%run_id, error = %message, "{command} failed");
    Err(failure)
}

async fn fetch_and_store(
    job: &IngestJob<'_>,
    warehouse: &Warehouse,
    settings: &Settings,
    http: Arc<dyn HttpClient>,
) -> Result<usize, CliError> {
    let cache = ResponseCache::open(&settings.cache_dir, job.cache_mode)?;
    let client =
        RateClient::new(&settings.api_base_url, http, cache).with_timeout(settings.http_timeout);

    let payload = match job.window {
        FetchWindow::Latest => client.fetch_latest(job.base, job.symbols).await?,
        FetchWindow::Range { start, end } => {
            client
                .fetch_timeseries(start, end, job.base, job.symbols)
                .await?
        }
    };

    let options = NormalizeOptions::default().with_base(CurrencyCode::parse(job.base)?);
    let rows = normalize_payload(&payload, &options)?;
    debug!(rows = rows.len(), "normalized payload");

    Ok(warehouse.upsert_rates(&rows)?)
}

#[cfg(test)]
mod test_support {
    use std::path::Path;
    use std::time::Duration;

    use super::*;

    pub fn settings_in(root: &Path) -> Settings {
        Settings {
            api_base_url: String::from("https://api.example.test"),
            db_path: root.join("data").join("fx.duckdb"),
            cache_dir: root.join("cache"),
            log_file: root.join("logs").join("app.log"),
            log_level: String::from("info"),
            http_timeout: Duration::from_secs(1),
        }
    }

    pub fn open_warehouse(settings: &Settings) -> Warehouse {
        Warehouse::open(WarehouseConfig {
            db_path: settings.db_path.clone(),
            max_pool_size: MAX_POOL_SIZE,
        })
        .expect("warehouse")
    }
}
