//! CLI argument definitions for fx-ingest.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `backfill` | Load every daily rate in a date window |
//! | `daily` | Load the latest published rates |
//!
//! # Examples
//!
//! ```bash
//! fx-ingest backfill --start 2026-01-01 --end 2026-01-31 --base USD --symbols BRL,EUR
//! fx-ingest daily --base USD --symbols BRL,EUR --no-cache
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fxingest_core::{parse_symbol_list, CacheMode, CurrencyCode, RateDate};

/// Ingest FX rates from a Frankfurter-compatible service into DuckDB.
#[derive(Debug, Parser)]
#[command(name = "fx-ingest", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a historical window of daily rates.
    ///
    ///   fx-ingest backfill --start 2026-02-01 --end 2026-02-10 --base USD --symbols BRL,EUR
    Backfill(BackfillArgs),

    /// Load the latest published rates.
    ///
    ///   fx-ingest daily --base USD --symbols BRL,EUR
    Daily(DailyArgs),
}

impl Command {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Backfill(_) => "backfill",
            Self::Daily(_) => "daily",
        }
    }

    pub fn common(&self) -> &CommonArgs {
        match self {
            Self::Backfill(args) => &args.common,
            Self::Daily(args) => &args.common,
        }
    }
}

/// Arguments for the `backfill` command.
#[derive(Debug, Clone, Args)]
pub struct BackfillArgs {
    /// First date of the window (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub start: RateDate,

    /// Last date of the window, inclusive (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub end: RateDate,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the `daily` command.
#[derive(Debug, Clone, Args)]
pub struct DailyArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options shared by every ingest command.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Base currency the rates are quoted against.
    #[arg(long)]
    pub base: String,

    /// Comma-separated quote currencies, e.g. `BRL,EUR`.
    #[arg(long, value_parser = parse_symbols)]
    pub symbols: SymbolList,

    /// DuckDB file to write to (overrides DB_PATH).
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Log level filter (overrides LOG_LEVEL).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Skip the response cache for reads and writes.
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,
}

impl CommonArgs {
    pub const fn cache_mode(&self) -> CacheMode {
        CacheMode::from_no_cache(self.no_cache)
    }
}

/// Non-empty list of normalized quote currencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolList(pub Vec<CurrencyCode>);

impl SymbolList {
    pub fn as_slice(&self) -> &[CurrencyCode] {
        &self.0
    }
}

fn parse_date(raw: &str) -> Result<RateDate, String> {
    RateDate::parse(raw).map_err(|error| error.to_string())
}

fn parse_symbols(raw: &str) -> Result<SymbolList, String> {
    parse_symbol_list(raw)
        .map(SymbolList)
        .map_err(|error| error.to_string())
}
