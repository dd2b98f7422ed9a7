//! Reference scanner: extracts `{{head(.tail)*}}` tokens from any value.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// A single scanned reference occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceToken {
    /// Leading identifier.
    pub head: String,
    /// Dotted tail segments after the head (may be empty).
    pub tail: Vec<String>,
    /// The full token as it appeared, braces included.
    pub raw: String,
}

impl ReferenceToken {
    /// The dotted expression without braces.
    pub fn expression(&self) -> String {
        if self.tail.is_empty() {
            self.head.clone()
        } else {
            format!("{}.{}", self.head, self.tail.join("."))
        }
    }

    /// Whether the tail addresses a node output.
    pub fn is_output_reference(&self) -> bool {
        self.tail.first().map(|s| s == "output").unwrap_or(false)
    }
}

pub(crate) fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}").unwrap()
    })
}

/// Extract all reference tokens from a string.
pub fn scan_string(text: &str) -> Vec<ReferenceToken> {
    token_regex()
        .captures_iter(text)
        .map(|cap| {
            let expr = cap[1].trim();
            let mut parts = expr.split('.');
            let head = parts.next().unwrap_or_default().to_string();
            let tail = parts.map(|s| s.to_string()).collect();
            ReferenceToken {
                head,
                tail,
                raw: cap[0].to_string(),
            }
        })
        .collect()
}

/// Recursively extract reference tokens from a value (strings inside arrays
/// and objects included).
pub fn scan_value(value: &Value) -> Vec<ReferenceToken> {
    let mut tokens = Vec::new();
    collect(value, &mut tokens);
    tokens
}

fn collect(value: &Value, tokens: &mut Vec<ReferenceToken>) {
    match value {
        Value::String(s) => tokens.extend(scan_string(s)),
        Value::Array(items) => {
            for item in items {
                collect(item, tokens);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                collect(v, tokens);
            }
        }
        _ => {}
    }
}
