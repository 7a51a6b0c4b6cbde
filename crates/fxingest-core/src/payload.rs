//! Upstream payload validation and shape detection.
//!
//! The rate service answers with one of two JSON shapes that carry no explicit
//! tag:
//!
//! ```text
//! snapshot: {"date": "2026-02-10", "base": "USD", "rates": {"BRL": 5.12}}
//! series:   {"base": "USD", "rates": {"2026-02-10": {"BRL": 5.12}}}
//! ```
//!
//! [`validate_payload`] is the gate every payload passes before it is cached
//! or normalized; [`RatePayload::from_value`] turns a validated payload into
//! an explicit variant.

use serde_json::{Map, Value};

use crate::PayloadError;

/// Check the minimal shape: an object whose `rates` field is an object.
pub fn validate_payload(payload: &Value) -> Result<&Map<String, Value>, PayloadError> {
    let object = payload.as_object().ok_or(PayloadError::InvalidPayload {
        reason: "payload is not an object",
    })?;
    let rates = object.get("rates").ok_or(PayloadError::InvalidPayload {
        reason: "missing 'rates' field",
    })?;
    if !rates.is_object() {
        return Err(PayloadError::InvalidPayload {
            reason: "'rates' must be an object",
        });
    }
    Ok(object)
}

/// A validated payload, discriminated by the shape of its `rates` values.
#[derive(Debug, Clone, PartialEq)]
pub enum RatePayload<'a> {
    /// Single observation date; symbols in encounter order.
    Snapshot {
        date: &'a str,
        base: Option<&'a str>,
        rates: Vec<(&'a str, f64)>,
    },
    /// Several observation dates, each with its own symbol rates.
    Series {
        base: Option<&'a str>,
        points: Vec<SeriesPoint<'a>>,
    },
}

/// All rates observed on one date of a series payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint<'a> {
    pub date: &'a str,
    pub rates: Vec<(&'a str, f64)>,
}

impl<'a> RatePayload<'a> {
    pub fn from_value(payload: &'a Value) -> Result<Self, PayloadError> {
        let object = validate_payload(payload)?;
        let base = object
            .get("base")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|base| !base.is_empty());
        let Some(rates) = object.get("rates").and_then(Value::as_object) else {
            return Err(PayloadError::InvalidPayload {
                reason: "'rates' must be an object",
            });
        };

        if !rates.is_empty() && rates.values().all(Value::is_number) {
            let date = object
                .get("date")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|date| !date.is_empty())
                .ok_or(PayloadError::MalformedSnapshot)?;
            let rates = symbol_rates(date, rates)?;
            return Ok(Self::Snapshot { date, base, rates });
        }

        let points = rates
            .iter()
            .map(|(date, per_symbol)| -> Result<SeriesPoint<'a>, PayloadError> {
                let per_symbol = per_symbol
                    .as_object()
                    .ok_or_else(|| PayloadError::MalformedSeries { date: date.clone() })?;
                Ok(SeriesPoint {
                    date: date.as_str(),
                    rates: symbol_rates(date, per_symbol)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::Series { base, points })
    }

    pub fn base(&self) -> Option<&'a str> {
        match self {
            Self::Snapshot { base, .. } | Self::Series { base, .. } => *base,
        }
    }
}

fn symbol_rates<'a>(
    date: &str,
    rates: &'a Map<String, Value>,
) -> Result<Vec<(&'a str, f64)>, PayloadError> {
    rates
        .iter()
        .map(|(symbol, value)| {
            coerce_rate(value)
                .map(|rate| (symbol.as_str(), rate))
                .ok_or_else(|| PayloadError::MalformedRate {
                    date: date.to_owned(),
                    symbol: symbol.clone(),
                })
        })
        .collect()
}

/// JSON numbers and numeric strings become finite floats; anything else is rejected.
fn coerce_rate(value: &Value) -> Option<f64> {
    let rate = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    rate.is_finite().then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_payload() {
        let error = validate_payload(&json!([1, 2])).expect_err("array payload");
        assert!(matches!(error, PayloadError::InvalidPayload { .. }));
    }

    #[test]
    fn rejects_missing_or_scalar_rates() {
        for payload in [json!({"base": "USD"}), json!({"rates": 5}), json!({"rates": ["BRL"]})] {
            assert!(matches!(
                validate_payload(&payload),
                Err(PayloadError::InvalidPayload { .. })
            ));
        }
    }

    #[test]
    fn numeric_rates_make_a_snapshot() {
        let payload = json!({"date": "2026-02-10", "base": "USD", "rates": {"BRL": 5.12, "EUR": 0.93}});
        let parsed = RatePayload::from_value(&payload).expect("snapshot");
        assert_eq!(
            parsed,
            RatePayload::Snapshot {
                date: "2026-02-10",
                base: Some("USD"),
                rates: vec![("BRL", 5.12), ("EUR", 0.93)],
            }
        );
    }

    #[test]
    fn snapshot_without_date_is_malformed() {
        let payload = json!({"base": "USD", "rates": {"BRL": 5.12}});
        assert_eq!(
            RatePayload::from_value(&payload),
            Err(PayloadError::MalformedSnapshot)
        );
    }

    #[test]
    fn nested_rates_make_a_series_in_encounter_order() {
        let payload = json!({
            "base": "USD",
            "rates": {"2026-02-10": {"EUR": 0.93, "BRL": 5.12}, "2026-02-09": {"BRL": 5.10}}
        });
        let RatePayload::Series { points, .. } = RatePayload::from_value(&payload).expect("series")
        else {
            panic!("expected a series payload");
        };
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2026-02-10");
        assert_eq!(points[0].rates, vec![("EUR", 0.93), ("BRL", 5.12)]);
        assert_eq!(points[1].date, "2026-02-09");
    }

    #[test]
    fn mixed_rates_are_a_malformed_series() {
        let payload = json!({"base": "USD", "rates": {"BRL": 5.12, "2026-02-10": {"BRL": 5.1}}});
        assert_eq!(
            RatePayload::from_value(&payload),
            Err(PayloadError::MalformedSeries {
                date: String::from("BRL")
            })
        );
    }

    #[test]
    fn non_numeric_series_rate_is_malformed() {
        let payload = json!({"rates": {"2026-02-10": {"BRL": "n/a"}}});
        assert_eq!(
            RatePayload::from_value(&payload),
            Err(PayloadError::MalformedRate {
                date: String::from("2026-02-10"),
                symbol: String::from("BRL"),
            })
        );
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let payload = json!({"rates": {"2026-02-10": {"BRL": " 5.5 "}}});
        let RatePayload::Series { points, base } = RatePayload::from_value(&payload).expect("series")
        else {
            panic!("expected a series payload");
        };
        assert_eq!(base, None);
        assert_eq!(points[0].rates, vec![("BRL", 5.5)]);
    }

    #[test]
    fn empty_rates_is_an_empty_series() {
        let payload = json!({"base": "USD", "date": "2026-02-10", "rates": {}});
        assert_eq!(
            RatePayload::from_value(&payload),
            Ok(RatePayload::Series {
                base: Some("USD"),
                points: Vec::new(),
            })
        );
    }
}
