//! Operation implementations for the Update-Variable node.

use serde_json::{Map, Value};

use crate::error::{NodeError, NodeResult};
use crate::evaluator;
use crate::registry::navigate_path;
use crate::template::display_string;

use super::update_variable::UpdateVariableConfig;

fn as_array(value: Value, what: &str) -> NodeResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(NodeError::TypeError(format!(
            "{} must be an array, got {}",
            what,
            crate::registry::value_type_name(&other)
        ))),
    }
}

fn stringified(config: &UpdateVariableConfig, value: Value) -> Value {
    if config.stringify() && (value.is_object() || value.is_array()) {
        Value::String(serde_json::to_string(&value).unwrap_or_default())
    } else {
        value
    }
}

pub(super) fn join(
    config: &UpdateVariableConfig,
    previous: Option<Value>,
    payload: Value,
) -> Value {
    let separator = config.join_str.clone().unwrap_or_default();
    let current = previous.map(|v| display_string(&v)).unwrap_or_default();
    let addition = display_string(&stringified(config, payload));
    if current.is_empty() {
        Value::String(addition)
    } else {
        Value::String(format!("{}{}{}", current, separator, addition))
    }
}

pub(super) fn append(
    config: &UpdateVariableConfig,
    previous: Option<Value>,
    payload: Value,
) -> NodeResult<Value> {
    let mut items = match previous {
        Some(value) => as_array(value, "append target")?,
        None => Vec::new(),
    };
    items.push(stringified(config, payload));
    Ok(Value::Array(items))
}

pub(super) fn extract(config: &UpdateVariableConfig, payload: Value) -> NodeResult<Value> {
    let field_path = config
        .field_path
        .as_deref()
        .ok_or_else(|| NodeError::ConfigError("extract requires field_path".into()))?;
    let items = as_array(payload, "extract payload")?;
    let extracted: Vec<Value> = items
        .iter()
        .filter_map(|item| navigate_path(item, field_path))
        .collect();
    Ok(Value::Array(extracted))
}

fn pick_one(value: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();
    for path in fields {
        if let Some(found) = navigate_path(value, path) {
            let key = path.rsplit('.').next().unwrap_or(path);
            out.insert(key.to_string(), found);
        }
    }
    Value::Object(out)
}

pub(super) fn pick(config: &UpdateVariableConfig, payload: Value) -> NodeResult<Value> {
    let fields = config
        .fields
        .as_deref()
        .ok_or_else(|| NodeError::ConfigError("pick requires fields".into()))?;
    match payload {
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(|item| pick_one(item, fields)).collect(),
        )),
        other => Ok(pick_one(&other, fields)),
    }
}

fn omit_one(value: &Value, fields: &[String]) -> Value {
    let mut out = value.clone();
    for path in fields {
        remove_path(&mut out, path);
    }
    out
}

fn remove_path(value: &mut Value, path: &str) {
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = value;
    for seg in &segments[..segments.len() - 1] {
        match current.get_mut(*seg) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Value::Object(map) = current {
        map.remove(segments[segments.len() - 1]);
    }
}

pub(super) fn omit(config: &UpdateVariableConfig, payload: Value) -> NodeResult<Value> {
    let fields = config
        .fields
        .as_deref()
        .ok_or_else(|| NodeError::ConfigError("omit requires fields".into()))?;
    match payload {
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(|item| omit_one(item, fields)).collect(),
        )),
        other => Ok(omit_one(&other, fields)),
    }
}

pub(super) fn map(config: &UpdateVariableConfig, payload: Value) -> NodeResult<Value> {
    let mapping = config
        .mapping
        .as_ref()
        .ok_or_else(|| NodeError::ConfigError("map requires mapping".into()))?;
    let items = as_array(payload, "map payload")?;
    let mapped: Vec<Value> = items
        .iter()
        .map(|item| {
            let mut out = Map::new();
            for (target_key, source) in mapping {
                let value = match source {
                    // a string is a source path; anything else is a literal
                    Value::String(path) => navigate_path(item, path).unwrap_or(Value::Null),
                    literal => literal.clone(),
                };
                out.insert(target_key.clone(), value);
            }
            Value::Object(out)
        })
        .collect();
    Ok(Value::Array(mapped))
}

pub(super) fn filter(config: &UpdateVariableConfig, payload: Value) -> NodeResult<Value> {
    let condition = config
        .condition
        .as_ref()
        .ok_or_else(|| NodeError::ConfigError("filter requires condition".into()))?;
    let items = as_array(payload, "filter payload")?;
    let mut kept = Vec::new();
    for item in items {
        let field_value = navigate_path(&item, &condition.field).unwrap_or(Value::Null);
        if evaluator::evaluate(&condition.operator, &field_value, &condition.value)? {
            kept.push(item);
        }
    }
    Ok(Value::Array(kept))
}

pub(super) fn slice(config: &UpdateVariableConfig, payload: Value) -> NodeResult<Value> {
    let items = as_array(payload, "slice payload")?;
    let start = config.slice_start.unwrap_or(0).min(items.len());
    let end = config.slice_end.unwrap_or(items.len()).min(items.len());
    if start >= end {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(Value::Array(items[start..end].to_vec()))
}

pub(super) fn flatten(payload: Value) -> NodeResult<Value> {
    let items = as_array(payload, "flatten payload")?;
    let mut out = Vec::new();
    for item in items {
        match item {
            Value::Array(inner) => out.extend(inner),
            other => out.push(other),
        }
    }
    Ok(Value::Array(out))
}

pub(super) fn concat(previous: Option<Value>, payload: Value) -> NodeResult<Value> {
    let mut items = match previous {
        Some(value) => as_array(value, "concat target")?,
        None => Vec::new(),
    };
    items.extend(as_array(payload, "concat payload")?);
    Ok(Value::Array(items))
}
