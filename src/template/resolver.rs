//! Variable substitution over strings and structured values.
//!
//! Two modes over a string: when the whole string is a single `{{…}}`
//! reference the resolved value is returned with its type preserved; when
//! references are embedded in surrounding text each is replaced by its
//! display string. An unresolved reference keeps its literal token.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::scanner::token_regex;
use crate::registry::Registry;

fn single_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\{\{\s*([^{}]+?)\s*\}\}\s*$").unwrap())
}

/// Resolve a string against the registry.
pub fn resolve_string(text: &str, registry: &dyn Registry) -> Value {
    if let Some(cap) = single_reference_regex().captures(text) {
        let expr = cap[1].trim();
        return registry.resolve_expression(expr).unwrap_or(Value::Null);
    }

    let rendered = token_regex().replace_all(text, |cap: &regex::Captures<'_>| {
        let expr = cap[1].trim();
        match registry.resolve_expression(expr) {
            Some(value) => display_string(&value),
            // keep the literal token so failures stay diagnosable
            None => cap[0].to_string(),
        }
    });
    Value::String(rendered.into_owned())
}

/// Recursively resolve a structured value: strings are substituted, arrays
/// and objects are walked, other leaves pass through.
pub fn resolve_value(value: &Value, registry: &dyn Registry) -> Value {
    match value {
        Value::String(s) => resolve_string(s, registry),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| resolve_value(v, registry)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, registry)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// String form of a value for template substitution: strings raw, scalars
/// via `to_string`, structures JSON-encoded, null empty.
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
