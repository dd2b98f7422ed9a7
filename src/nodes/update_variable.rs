//! Update-Variable node: mutates a flow variable through one of a closed
//! set of operations and reports the mutation as its node output.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{NodeError, NodeResult};
use crate::executor::ExecutionContext;
use crate::flow::NodeSchema;
use crate::registry::Registry;
use crate::template::resolve_value;

use super::executor::NodeExecutor;
use super::update_variable_ops as ops;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVariableConfig {
    pub variable_id: String,
    #[serde(rename = "type")]
    pub operation: String,
    #[serde(default)]
    pub join_str: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub field_path: Option<String>,
    #[serde(default)]
    pub mapping: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub condition: Option<FilterCondition>,
    #[serde(default)]
    pub slice_start: Option<usize>,
    #[serde(default)]
    pub slice_end: Option<usize>,
    #[serde(default)]
    pub stringify_output: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl UpdateVariableConfig {
    /// `join` and `append` JSON-encode object payloads by default; the
    /// transforms do not.
    pub fn stringify(&self) -> bool {
        self.stringify_output
            .unwrap_or(matches!(self.operation.as_str(), "join" | "append"))
    }
}

pub struct UpdateVariableExecutor;

#[async_trait]
impl NodeExecutor for UpdateVariableExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        _context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config: UpdateVariableConfig = serde_json::from_value(node.config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;

        let payload = resolve_value(&node.value, registry);
        let previous = registry.get_variable(&config.variable_id);
        if previous.is_none() {
            tracing::warn!(
                variable_id = %config.variable_id,
                node_id = %node.id,
                "update target variable was not declared; creating it"
            );
        }

        let new_value = apply_operation(&config, previous.clone(), payload.clone())?;
        registry.set_variable(&config.variable_id, new_value.clone())?;

        Ok(json!({
            "variable_id": config.variable_id,
            "previous_value": previous.unwrap_or(Value::Null),
            "new_value": new_value,
            "operation": config.operation,
            "resolved_input": payload,
        }))
    }
}

fn apply_operation(
    config: &UpdateVariableConfig,
    previous: Option<Value>,
    payload: Value,
) -> NodeResult<Value> {
    match config.operation.as_str() {
        "update" => Ok(payload),
        "join" => Ok(ops::join(config, previous, payload)),
        "append" => ops::append(config, previous, payload),
        "extract" => ops::extract(config, payload),
        "pick" => ops::pick(config, payload),
        "omit" => ops::omit(config, payload),
        "map" => ops::map(config, payload),
        "filter" => ops::filter(config, payload),
        "slice" => ops::slice(config, payload),
        "flatten" => ops::flatten(payload),
        "concat" => ops::concat(previous, payload),
        other => Err(NodeError::ConfigError(format!(
            "unknown update operation: {}",
            other
        ))),
    }
}
