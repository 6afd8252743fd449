//! Percentage extraction from search API payloads.

use regex::Regex;
use serde_json::Value;

/// Pattern for snippets like `"82% liked this movie"`.
pub fn liked_pattern() -> Result<Regex, regex::Error> {
    Regex::new(r"(?i)\b(\d{1,3})\s*%\s*liked this")
}

/// Find the first string in `body` matching `pattern` and return its percentage.
///
/// Strings are visited depth first. Values above 100 are ignored.
pub fn extract_percentage(pattern: &Regex, body: &Value) -> Option<u8> {
    match body {
        Value::String(text) => pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u8>().ok())
            .find(|pct| *pct <= 100),
        Value::Array(items) => items.iter().find_map(|v| extract_percentage(pattern, v)),
        Value::Object(map) => map.values().find_map(|v| extract_percentage(pattern, v)),
        _ => None,
    }
}
