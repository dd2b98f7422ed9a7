use serde_json::Value;

use crate::error::{NodeError, NodeResult};

/// Closed set of comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
}

impl ComparisonOperator {
    pub fn parse(op: &str) -> NodeResult<Self> {
        match op {
            "equals" => Ok(ComparisonOperator::Equals),
            "not_equals" => Ok(ComparisonOperator::NotEquals),
            "greater_than" => Ok(ComparisonOperator::GreaterThan),
            "less_than" => Ok(ComparisonOperator::LessThan),
            "contains" => Ok(ComparisonOperator::Contains),
            other => Err(NodeError::UnknownOperator(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equals => "equals",
            ComparisonOperator::NotEquals => "not_equals",
            ComparisonOperator::GreaterThan => "greater_than",
            ComparisonOperator::LessThan => "less_than",
            ComparisonOperator::Contains => "contains",
        }
    }

    pub fn evaluate(&self, value: &Value, target: &Value) -> bool {
        match self {
            // strict structural equality, no coercion
            ComparisonOperator::Equals => value == target,
            ComparisonOperator::NotEquals => value != target,
            ComparisonOperator::GreaterThan => compare_numeric(value, target, |a, b| a > b),
            ComparisonOperator::LessThan => compare_numeric(value, target, |a, b| a < b),
            ComparisonOperator::Contains => contains(value, target),
        }
    }
}

/// Evaluate an operator given by its wire name.
pub fn evaluate(op: &str, value: &Value, target: &Value) -> NodeResult<bool> {
    Ok(ComparisonOperator::parse(op)?.evaluate(value, target))
}

fn compare_numeric(value: &Value, target: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    match (coerce_f64(value), coerce_f64(target)) {
        (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => cmp(a, b),
        _ => false,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn contains(value: &Value, target: &Value) -> bool {
    match (value, target) {
        (Value::String(s), Value::String(t)) => s.contains(t.as_str()),
        (Value::Array(items), t) => items.contains(t),
        _ => false,
    }
}
