//! Collapse snapshot and series payloads into [`RateRow`]s.

use fxingest_warehouse::RateRow;
use serde_json::Value;

use crate::domain::{CurrencyCode, UtcDateTime};
use crate::payload::RatePayload;
use crate::PayloadError;

pub const DEFAULT_SOURCE: &str = "frankfurter";

/// Caller-supplied values stamped onto every normalized row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Overrides the payload's own `base` field when set.
    pub base: Option<CurrencyCode>,
    pub source: String,
    /// Capture time; the current instant when unset.
    pub fetched_at: Option<UtcDateTime>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            base: None,
            source: DEFAULT_SOURCE.to_owned(),
            fetched_at: None,
        }
    }
}

impl NormalizeOptions {
    pub fn with_base(mut self, base: CurrencyCode) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_fetched_at(mut self, fetched_at: UtcDateTime) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }
}

/// Normalize a raw payload into rows ordered as encountered in the payload.
pub fn normalize_payload(
    payload: &Value,
    options: &NormalizeOptions,
) -> Result<Vec<RateRow>, PayloadError> {
    let parsed = RatePayload::from_value(payload)?;
    let base = match (&options.base, parsed.base()) {
        (Some(base), _) => base.as_str().to_owned(),
        (None, Some(base)) => base.to_uppercase(),
        (None, None) => return Err(PayloadError::MissingBase),
    };
    let fetched_at = options
        .fetched_at
        .unwrap_or_else(UtcDateTime::now)
        .format_rfc3339();

    let row = |date: &str, symbol: &str, rate: f64| RateRow {
        date: date.to_owned(),
        base: base.clone(),
        symbol: symbol.trim().to_uppercase(),
        rate,
        source: options.source.clone(),
        fetched_at: fetched_at.clone(),
    };

    let rows = match parsed {
        RatePayload::Snapshot { date, rates, .. } => rates
            .into_iter()
            .map(|(symbol, rate)| row(date, symbol, rate))
            .collect(),
        RatePayload::Series { points, .. } => points
            .into_iter()
            .flat_map(|point| {
                point
                    .rates
                    .into_iter()
                    .map(move |(symbol, rate)| (point.date, symbol, rate))
            })
            .map(|(date, symbol, rate)| row(date, symbol, rate))
            .collect(),
    };
    Ok(rows)
}
