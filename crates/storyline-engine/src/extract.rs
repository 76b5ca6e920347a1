//! Declarative payload extractors.
//!
//! Upstream agents answer with heterogeneous shapes: the same concept hides
//! behind several optional key names, sometimes at the top level and
//! sometimes under a `content` object. Instead of ad hoc shape-sniffing,
//! each concept gets one ordered key list tried in priority order; the first
//! non-empty structured match wins.

use serde_json::Value;

/// Key names carrying the insights list, in priority order.
pub const INSIGHT_KEYS: &[&str] = &["insights", "key_insights", "findings", "highlights"];
/// Key names carrying citations.
pub const CITATION_KEYS: &[&str] = &["citations", "sources", "references"];
/// Key names carrying a section title.
pub const TITLE_KEYS: &[&str] = &["title", "headline", "section_title"];
/// Key names carrying a confidence/quality score.
pub const SCORE_KEYS: &[&str] = &["score", "confidence", "quality_score"];
/// Key names carrying chart-shaped data.
pub const CHART_KEYS: &[&str] = &["chart_data", "chart", "charts", "visualization"];

/// Look a key up at the top level, then under the `content` object.
fn lookup<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    payload
        .get(key)
        .or_else(|| payload.get("content").and_then(|c| c.get(key)))
}

/// First non-empty list of strings among `keys`.
/// Non-string array elements are skipped rather than failing the match.
pub fn string_list(payload: &Value, keys: &[&str]) -> Option<Vec<String>> {
    for key in keys {
        if let Some(Value::Array(items)) = lookup(payload, key) {
            let list: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if !list.is_empty() {
                return Some(list);
            }
        }
    }
    None
}

/// First non-empty array among `keys`, elements kept as raw JSON.
pub fn value_list(payload: &Value, keys: &[&str]) -> Option<Vec<Value>> {
    for key in keys {
        if let Some(Value::Array(items)) = lookup(payload, key) {
            if !items.is_empty() {
                return Some(items.clone());
            }
        }
    }
    None
}

/// First non-empty string among `keys`.
pub fn string(payload: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = lookup(payload, key).and_then(Value::as_str) {
            if !v.trim().is_empty() {
                return Some(v.to_string());
            }
        }
    }
    None
}

/// First numeric value among `keys`.
pub fn number(payload: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(n) = lookup(payload, key).and_then(Value::as_f64) {
            return Some(n);
        }
    }
    None
}

/// First structured (object or non-empty array) value among `keys`.
pub fn structured(payload: &Value, keys: &[&str]) -> Option<Value> {
    for key in keys {
        match lookup(payload, key) {
            Some(v @ Value::Object(_)) => return Some(v.clone()),
            Some(Value::Array(items)) if !items.is_empty() => {
                return Some(Value::Array(items.clone()))
            }
            _ => {}
        }
    }
    None
}
