//! Content-addressed, file-backed cache of upstream responses.
//!
//! Each entry lives at `<cache_dir>/<fingerprint>.json` where the fingerprint
//! is the SHA-256 of the canonical `{"endpoint": .., "params": {..}}` document.
//! Entries never expire and are never rewritten in place; a write lands in a
//! temporary file that is atomically renamed over the target.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fxingest_warehouse::{canonical_json, escape_non_ascii};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::CacheError;

/// Whether a fetch may read from and write to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read a stored entry when present; otherwise fetch and store. (Default)
    #[default]
    Use,
    /// Never read or write cache entries; every fetch goes to the network.
    Bypass,
}

impl CacheMode {
    pub const fn from_no_cache(no_cache: bool) -> Self {
        if no_cache {
            Self::Bypass
        } else {
            Self::Use
        }
    }

    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Use)
    }
}

/// Lowercase hex SHA-256 cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint an endpoint path plus query parameters.
    ///
    /// Parameters are keyed by name, so the order they are supplied in does
    /// not affect the result.
    pub fn compute<K, V>(
        endpoint: &str,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, CacheError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let params: BTreeMap<String, String> = params
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        let canonical = canonical_json(&json!({ "endpoint": endpoint, "params": params }))?;
        let digest = Sha256::digest(canonical.as_bytes());
        Ok(Self(hex::encode(digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// File-backed response cache.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    mode: CacheMode,
}

impl ResponseCache {
    /// Open a cache rooted at `dir`, creating the directory when caching is enabled.
    pub fn open(dir: impl Into<PathBuf>, mode: CacheMode) -> Result<Self, CacheError> {
        let dir = dir.into();
        if mode.is_enabled() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir, mode })
    }

    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    pub const fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn entry_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.dir.join(format!("{fingerprint}.json"))
    }

    /// Return the stored payload, or `None` when absent or the cache is bypassed.
    pub fn get(&self, fingerprint: &Fingerprint) -> Result<Option<Value>, CacheError> {
        if !self.mode.is_enabled() {
            return Ok(None);
        }

        let body = match fs::read_to_string(self.entry_path(fingerprint)) {
            Ok(body) => body,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                fingerprint: fingerprint.to_string(),
                source,
            })
    }

    /// Store `payload` under `fingerprint`, replacing any previous entry.
    ///
    /// No-op when the cache is bypassed.
    pub fn put(&self, fingerprint: &Fingerprint, payload: &Value) -> Result<(), CacheError> {
        if !self.mode.is_enabled() {
            return Ok(());
        }

        let body = escape_non_ascii(&serde_json::to_string(payload)?);
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(body.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(self.entry_path(fingerprint))?;
        Ok(())
    }
}
