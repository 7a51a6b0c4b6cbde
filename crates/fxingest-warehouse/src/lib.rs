//! # fx-ingest Warehouse
//!
//! DuckDB-backed storage for normalized FX rates and the audit trail of
//! ingest runs.
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `fx_rates` | One row per `(date, base, symbol)` observation |
//! | `ingest_runs` | Append-only lifecycle record of every ingest attempt |
//! | `schema_migrations` | Applied migration versions |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fxingest_warehouse::{RateRow, RunOutcome, Warehouse, WarehouseConfig};
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open(WarehouseConfig::default())?;
//!     let run_id = warehouse.start_run("daily", &json!({"base": "USD"}))?;
//!
//!     let rows = vec![RateRow {
//!         date: "2026-02-10".to_string(),
//!         base: "USD".to_string(),
//!         symbol: "BRL".to_string(),
//!         rate: 5.12,
//!         source: "frankfurter".to_string(),
//!         fetched_at: "2026-02-10T00:00:00Z".to_string(),
//!     }];
//!     let written = warehouse.upsert_rates(&rows)?;
//!     warehouse.finish_run(run_id, RunOutcome::ok(written as u64))?;
//!     Ok(())
//! }
//! ```

pub mod canonical;
pub mod duckdb;
pub mod migrations;
pub mod run;

use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::Connection;
use ::duckdb::ToSql;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub use canonical::{canonical_json, escape_non_ascii};
pub use duckdb::{DuckDbConnectionManager, PooledConnection};
pub use run::{IngestRun, RunId, RunOutcome, RunStatus};

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Run arguments could not be serialized.
    #[error("failed to serialize run arguments: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Current time could not be formatted.
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("ingest run {run_id} does not exist")]
    RunNotFound { run_id: RunId },

    #[error("ingest run {run_id} is already finished with status {status}")]
    RunAlreadyFinished { run_id: RunId, status: RunStatus },

    #[error("ingest run {run_id} cannot move from {from} to {to}")]
    InvalidTransition {
        run_id: RunId,
        from: RunStatus,
        to: RunStatus,
    },

    #[error("ingest run {run_id} has unknown status '{status}'")]
    CorruptRun { run_id: RunId, status: String },
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data").join("fx.duckdb"),
            max_pool_size: 2,
        }
    }
}

/// One normalized rate observation, keyed by `(date, base, symbol)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRow {
    /// Observation date (`YYYY-MM-DD`).
    pub date: String,
    /// Base currency code.
    pub base: String,
    /// Quote currency code.
    pub symbol: String,
    /// Units of `symbol` per unit of `base`.
    pub rate: f64,
    /// Upstream provider identifier.
    pub source: String,
    /// Capture timestamp, RFC3339 UTC.
    pub fetched_at: String,
}

/// A rate row as stored, including bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRate {
    /// Observation date (`YYYY-MM-DD`).
    pub date: String,
    /// Base currency code.
    pub base: String,
    /// Quote currency code.
    pub symbol: String,
    /// Units of `symbol` per unit of `base`.
    pub rate: f64,
    /// Upstream provider identifier of the latest write.
    pub source: String,
    /// Capture timestamp of the latest write, RFC3339 UTC.
    pub fetched_at: String,
    /// When the key was first stored; never changes afterwards.
    pub created_at: String,
    /// When the row was last written.
    pub updated_at: String,
}

/// The rate store.
#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open (creating if needed) the warehouse and apply pending migrations.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = DuckDbConnectionManager::open(config.db_path, config.max_pool_size)?;
        let warehouse = Self { manager };
        warehouse.initialize()?;
        Ok(warehouse)
    }

    /// Apply schema migrations.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Insert or update rate rows in a single transaction.
    ///
    /// Existing rows keep `created_at`; `rate`, `source`, `fetched_at` and
    /// `updated_at` are overwritten. Returns the number of rows processed.
    pub fn upsert_rates(&self, rows: &[RateRow]) -> Result<usize, WarehouseError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, WarehouseError> {
            let mut statement = connection.prepare(
                "INSERT INTO fx_rates (date, base, symbol, rate, source, fetched_at) \
                 VALUES (?, ?, ?, ?, ?, ?) \
                 ON CONFLICT (date, base, symbol) DO UPDATE SET \
                 rate = excluded.rate, \
                 source = excluded.source, \
                 fetched_at = excluded.fetched_at, \
                 updated_at = now()",
            )?;
            for row in rows {
                let params: [&dyn ToSql; 6] = [
                    &row.date,
                    &row.base,
                    &row.symbol,
                    &row.rate,
                    &row.source,
                    &row.fetched_at,
                ];
                statement.execute(params.as_slice())?;
            }
            Ok(rows.len())
        })();

        finalize_transaction(&connection, result)
    }

    /// Record the start of an ingest attempt and return its identifier.
    pub fn start_run(&self, command: &str, args: &Value) -> Result<RunId, WarehouseError> {
        let args = canonical_json(args)?;
        let started_at = now_rfc3339()?;

        let connection = self.manager.acquire()?;
        let id: i64 =
            connection.query_row("SELECT nextval('ingest_runs_id_seq')", [], |row| row.get(0))?;
        let status = RunStatus::Running.as_str();
        let params: [&dyn ToSql; 5] = [&id, &command, &args, &status, &started_at];
        connection.execute(
            "INSERT INTO ingest_runs (id, command, args, status, started_at) \
             VALUES (?, ?, ?, ?, ?)",
            params.as_slice(),
        )?;

        Ok(RunId::new(id))
    }

    /// Move a running ingest attempt to its terminal status.
    pub fn finish_run(&self, run_id: RunId, outcome: RunOutcome) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), WarehouseError> {
            let current = read_status(&connection, run_id)?;
            let status = current.transition(run_id, outcome.status)?.as_str();
            let finished_at = now_rfc3339()?;
            let rows_inserted = i64::try_from(outcome.rows_inserted).unwrap_or(i64::MAX);
            let id = run_id.get();

            let params: [&dyn ToSql; 5] = [
                &status,
                &finished_at,
                &rows_inserted,
                &outcome.error_message,
                &id,
            ];
            connection.execute(
                "UPDATE ingest_runs \
                 SET status = ?, finished_at = ?, rows_inserted = ?, error_message = ? \
                 WHERE id = ?",
                params.as_slice(),
            )?;
            Ok(())
        })();

        finalize_transaction(&connection, result)
    }

    /// Load one ingest run.
    pub fn load_run(&self, run_id: RunId) -> Result<IngestRun, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT command, args, status, started_at, finished_at, rows_inserted, error_message \
             FROM ingest_runs WHERE id = ?",
        )?;
        let id = run_id.get();
        let params: [&dyn ToSql; 1] = [&id];
        let mut rows = statement.query(params.as_slice())?;
        let Some(row) = rows.next()? else {
            return Err(WarehouseError::RunNotFound { run_id });
        };

        let status: String = row.get(2)?;
        let rows_inserted: i64 = row.get(5)?;
        Ok(IngestRun {
            id: run_id,
            command: row.get(0)?,
            args: row.get(1)?,
            status: RunStatus::parse(&status)
                .ok_or(WarehouseError::CorruptRun { run_id, status })?,
            started_at: row.get(3)?,
            finished_at: row.get(4)?,
            rows_inserted: u64::try_from(rows_inserted).unwrap_or_default(),
            error_message: row.get(6)?,
        })
    }

    /// Load the stored row for one `(date, base, symbol)` key.
    pub fn load_rate(
        &self,
        date: &str,
        base: &str,
        symbol: &str,
    ) -> Result<Option<StoredRate>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT date, base, symbol, rate, source, fetched_at, \
             CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR) \
             FROM fx_rates WHERE date = ? AND base = ? AND symbol = ?",
        )?;
        let params: [&dyn ToSql; 3] = [&date, &base, &symbol];
        let mut rows = statement.query(params.as_slice())?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        Ok(Some(StoredRate {
            date: row.get(0)?,
            base: row.get(1)?,
            symbol: row.get(2)?,
            rate: row.get(3)?,
            source: row.get(4)?,
            fetched_at: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        }))
    }

    /// Number of stored rate rows.
    pub fn count_rates(&self) -> Result<u64, WarehouseError> {
        let connection = self.manager.acquire()?;
        let count: i64 = connection.query_row("SELECT COUNT(*) FROM fx_rates", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn read_status(connection: &Connection, run_id: RunId) -> Result<RunStatus, WarehouseError> {
    let mut statement = connection.prepare("SELECT status FROM ingest_runs WHERE id = ?")?;
    let id = run_id.get();
    let params: [&dyn ToSql; 1] = [&id];
    let mut rows = statement.query(params.as_slice())?;
    let Some(row) = rows.next()? else {
        return Err(WarehouseError::RunNotFound { run_id });
    };
    let status: String = row.get(0)?;
    RunStatus::parse(&status).ok_or(WarehouseError::CorruptRun { run_id, status })
}

/// Finalize a transaction, committing on success or rolling back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn now_rfc3339() -> Result<String, WarehouseError> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}
