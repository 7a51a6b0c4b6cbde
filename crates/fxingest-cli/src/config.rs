//! Environment-backed runtime settings.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `API_BASE_URL` | `https://api.frankfurter.dev` |
//! | `DB_PATH` | `data/fx.duckdb` |
//! | `CACHE_DIR` | `.cache/http` |
//! | `LOG_FILE` | `logs/app.log` |
//! | `LOG_LEVEL` | `info` |
//! | `HTTP_TIMEOUT_SECS` | `20` |
//!
//! A `.env` file in the working directory is loaded first when present.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use fxingest_core::DEFAULT_BASE_URL;

use crate::error::CliError;

const DEFAULT_DB_PATH: &str = "data/fx.duckdb";
const DEFAULT_CACHE_DIR: &str = ".cache/http";
const DEFAULT_LOG_FILE: &str = "logs/app.log";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub db_path: PathBuf,
    pub cache_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
    pub http_timeout: Duration,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, CliError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        let timeout_secs: u64 = env_var_parse(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(CliError::Config(String::from(
                "HTTP_TIMEOUT_SECS must be greater than zero",
            )));
        }

        Ok(Self {
            api_base_url: var("API_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_owned(),
            db_path: PathBuf::from(var("DB_PATH", DEFAULT_DB_PATH)),
            cache_dir: PathBuf::from(var("CACHE_DIR", DEFAULT_CACHE_DIR)),
            log_file: PathBuf::from(var("LOG_FILE", DEFAULT_LOG_FILE)),
            log_level: var("LOG_LEVEL", DEFAULT_LOG_LEVEL),
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Apply per-invocation flag overrides.
    pub fn with_overrides(mut self, db_path: Option<PathBuf>, log_level: Option<String>) -> Self {
        if let Some(db_path) = db_path {
            self.db_path = db_path;
        }
        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
        self
    }

    /// Create the database, cache and log parent directories.
    pub fn ensure_runtime_paths(&self) -> Result<(), CliError> {
        create_parent(&self.db_path)?;
        fs::create_dir_all(&self.cache_dir)?;
        create_parent(&self.log_file)?;
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<(), CliError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

fn env_var_parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, CliError> {
    match lookup(key).map(|value| value.trim().to_owned()) {
        Some(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| CliError::Config(format!("{key} has an invalid value: '{value}'"))),
        _ => Ok(default),
    }
}
