//! Canonical JSON serialization.
//!
//! Object keys are sorted recursively and every non-ASCII character is written
//! as a `\uXXXX` escape, so two structurally equal values always serialize to
//! the same bytes regardless of insertion order.

use std::collections::BTreeMap;

use serde_json::Value;

/// Serialize `value` with recursively sorted object keys and ASCII-only output.
pub fn canonical_json(value: &Value) -> Result<String, serde_json::Error> {
    let sorted = sort_keys(value);
    let compact = serde_json::to_string(&sorted)?;
    Ok(escape_non_ascii(&compact))
}

/// Rewrite every non-ASCII character as a JSON `\uXXXX` escape (UTF-16 units).
///
/// Non-ASCII characters can only occur inside JSON strings, so escaping them
/// everywhere keeps the document valid.
pub fn escape_non_ascii(json: &str) -> String {
    if json.is_ascii() {
        return json.to_owned();
    }

    let mut output = String::with_capacity(json.len() + 16);
    let mut units = [0_u16; 2];
    for ch in json.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }
        for unit in ch.encode_utf16(&mut units) {
            output.push_str(&format!("\\u{unit:04x}"));
        }
    }
    output
}

fn sort_keys(value: &Value) -> SortedValue<'_> {
    match value {
        Value::Object(map) => SortedValue::Object(
            map.iter()
                .map(|(key, value)| (key.as_str(), sort_keys(value)))
                .collect(),
        ),
        Value::Array(items) => SortedValue::Array(items.iter().map(sort_keys).collect()),
        other => SortedValue::Leaf(other),
    }
}

#[derive(serde::Serialize)]
#[serde(untagged)]
enum SortedValue<'a> {
    Object(BTreeMap<&'a str, SortedValue<'a>>),
    Array(Vec<SortedValue<'a>>),
    Leaf(&'a Value),
}
