//! Declared variable types and dotted-path navigation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type tag of a flow variable. A declaration without a type is
/// untyped and skips write-time checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    String,
    Number,
    Boolean,
    File,
    Array,
    Object,
}

impl VarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::String => "string",
            VarType::Number => "number",
            VarType::Boolean => "boolean",
            VarType::File => "file",
            VarType::Array => "array",
            VarType::Object => "object",
        }
    }

    /// Exact type check. `object` rejects arrays; `file` holds a string
    /// handle id once registered.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            VarType::String => value.is_string(),
            VarType::Number => value.is_number(),
            VarType::Boolean => value.is_boolean(),
            VarType::File => value.is_string(),
            VarType::Array => value.is_array(),
            VarType::Object => value.is_object(),
        }
    }
}

/// Navigate a value by dotted-path segments. Arrays accept numeric segments.
pub fn navigate(value: &Value, segments: &[&str]) -> Option<Value> {
    let mut current = value;
    for seg in segments {
        match current {
            Value::Object(map) => current = map.get(*seg)?,
            Value::Array(items) => {
                let idx: usize = seg.parse().ok()?;
                current = items.get(idx)?;
            }
            _ => return None,
        }
    }
    Some(current.clone())
}

/// Navigate a value by a dotted path string (`"a.b.0.c"`).
pub fn navigate_path(value: &Value, path: &str) -> Option<Value> {
    if path.is_empty() {
        return Some(value.clone());
    }
    let segments: Vec<&str> = path.split('.').collect();
    navigate(value, &segments)
}
