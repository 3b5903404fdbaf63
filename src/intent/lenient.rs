//! Defensive deserialization helpers
//!
//! Intents come from an untrusted, probabilistic interpreter and a
//! best-effort answer is preferred over a hard failure:
//! - an unknown vocabulary value resolves to that vocabulary's default;
//! - a field of the wrong JSON kind is treated as absent;
//! - list elements that cannot be read as the expected object are skipped.
//!
//! The only hard deserialization failure is a document that is not a JSON
//! object at the top level. Nothing in this module builds SQL text; every
//! value read here is still subject to identifier validation, authorization
//! and literal escaping in the compiler.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Read a closed vocabulary, falling back to its default when the value is
/// missing, of the wrong kind, or not one of the known names.
pub(crate) fn vocabulary<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default + fmt::Display,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_vocabulary(&value).unwrap_or_else(|| {
        let fallback = T::default();
        tracing::debug!(fallback = %fallback, "unrecognized vocabulary value; using default");
        fallback
    }))
}

/// Optional vocabulary: absent, null, empty or non-string values are `None`;
/// an unrecognized string is the vocabulary default.
pub(crate) fn opt_vocabulary<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default + fmt::Display,
{
    let value = Value::deserialize(deserializer)?;
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(Some(s.parse().unwrap_or_else(|_| {
            let fallback = T::default();
            tracing::debug!(fallback = %fallback, "unrecognized vocabulary value; using default");
            fallback
        }))),
        _ => Ok(None),
    }
}

fn parse_vocabulary<T: FromStr>(value: &Value) -> Option<T> {
    value.as_str().and_then(|s| s.parse().ok())
}

/// String field; any other JSON kind reads as the empty string.
pub(crate) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Optional string field; empty strings and other JSON kinds are `None`.
pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Optional integer field. Integral floats (`3.0`) are accepted; strings,
/// fractional numbers and everything else are `None`.
pub(crate) fn opt_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(integer(&value))
}

fn integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    let f = number.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// List of objects. A non-array reads as empty; unreadable elements are skipped.
pub(crate) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if parsed.len() < total {
        tracing::debug!(skipped = total - parsed.len(), "skipped unreadable list elements");
    }
    Ok(parsed)
}

/// Optional nested object; anything that is not a readable object is `None`.
pub(crate) fn opt_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

/// Optional raw JSON value; `null` is `None`.
pub(crate) fn opt_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(other),
    })
}
