//! SQL literal rendering
//!
//! This is the only place request-provided scalars become SQL text.
//! Strings are single-quoted with embedded quotes doubled; numbers are
//! re-rendered from their parsed JSON form; dates are re-rendered from a
//! parsed `NaiveDate`, never copied from input.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Double every single quote
pub fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// `'...'` with embedded quotes doubled
pub fn quote_string(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Render a JSON scalar as a SQL literal.
///
/// Returns `None` for null, arrays and objects: those never become literals.
pub fn scalar_literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(quote_string(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("TRUE".to_string()),
        Value::Bool(false) => Some("FALSE".to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Where the wildcard goes in a LIKE pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeShape {
    Contains,
    StartsWith,
    EndsWith,
}

/// Build a quoted ILIKE pattern from a scalar.
///
/// LIKE metacharacters in the value are escaped first, then the wildcards are
/// added, then the whole pattern is quote-escaped. A `%` or `_` supplied in the
/// value therefore matches literally.
pub fn like_pattern(value: &Value, shape: LikeShape) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let escaped = escape_like(&text);
    let pattern = match shape {
        LikeShape::Contains => format!("%{}%", escaped),
        LikeShape::StartsWith => format!("{}%", escaped),
        LikeShape::EndsWith => format!("%{}", escaped),
    };
    Some(quote_string(&pattern))
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Strictly parse a date: `YYYY-MM-DD`, or an RFC 3339 timestamp (date part).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(input).ok().map(|dt| dt.date_naive()))
}

/// A date bound after sanitization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizedDate {
    pub date: NaiveDate,
    /// True when the input failed to parse and `today` was substituted
    pub substituted: bool,
}

/// Parse-or-replace: an unparsable date becomes `today`.
///
/// This mirrors long-standing behavior and is debatable; callers surface
/// `substituted` as a warning so the substitution is never silent.
pub fn sanitize_date(input: &str, today: NaiveDate) -> SanitizedDate {
    match parse_date(input) {
        Some(date) => SanitizedDate { date, substituted: false },
        None => SanitizedDate { date: today, substituted: true },
    }
}

/// `'YYYY-MM-DD'::date`
pub fn date_literal(date: NaiveDate) -> String {
    format!("'{}'::date", date.format("%Y-%m-%d"))
}
