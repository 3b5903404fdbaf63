//! Locate the intent JSON inside a raw interpreter response.
//!
//! Interpreters are asked for bare JSON but often wrap it in prose or a
//! fenced code block. Extraction is purely textual; the result is parsed
//! (defensively) afterwards.

use regex::Regex;
use std::sync::OnceLock;

/// First fenced block, optional `json` tag, body captured lazily
const FENCE_PATTERN: &str = r"(?i)```(?:json)?\s*([\s\S]*?)```";

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(FENCE_PATTERN).ok()).as_ref()
}

/// Return the JSON object text embedded in `response`.
///
/// Tried in order: the whole trimmed response, the body of the first fenced
/// block if it is an object, the span from the first `{` to the last `}`.
/// Falls back to `"{}"` when nothing object-shaped is found.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return "{}";
    }
    if is_object_text(trimmed) {
        return trimmed;
    }
    if let Some(block) = first_fenced_block(trimmed) {
        if is_object_text(block) {
            return block;
        }
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(first), Some(last)) if last > first => &trimmed[first..=last],
        _ => "{}",
    }
}

fn is_object_text(s: &str) -> bool {
    s.starts_with('{') && s.ends_with('}')
}

fn first_fenced_block(text: &str) -> Option<&str> {
    let captures = fence_pattern()?.captures(text)?;
    captures.get(1).map(|body| body.as_str().trim())
}
