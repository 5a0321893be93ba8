//! # models::number
//!
//! Lenient numeric decoding for gateway payloads.
//!
//! The gateway is inconsistent about numeric fields: plain JSON numbers,
//! strings such as `"17,500.00"`, and summary entries shaped like
//! `{ "amount": 50000.0, "currency": "USD" }` all occur. Anything that does not
//! parse decodes to `None` instead of failing the whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `deserialize_with` target for `Option<f64>` fields. Pair with `#[serde(default)]`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        Value::Object(map) => map.get("amount").and_then(number_from_value),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// Label fields (`symbol`, `ticker`, `conid`...): strings are trimmed, numbers
/// rendered, everything else and blank strings yield `None`.
pub(crate) fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
