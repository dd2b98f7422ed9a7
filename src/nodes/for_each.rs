//! For-Each node: sequential iteration over an array with a scoped registry
//! view per iteration.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{NodeError, NodeResult};
use crate::executor::ExecutionContext;
use crate::flow::NodeSchema;
use crate::registry::{Registry, ScopedRegistry};
use crate::template::resolve_value;

use super::executor::{run_child_node, NodeExecutor};

#[derive(Debug, Clone, Deserialize)]
pub struct ForEachConfig {
    pub each_key: String,
    /// Milliseconds slept between iterations (not after the last).
    #[serde(default)]
    pub delay_between: u64,
}

pub struct ForEachExecutor;

#[async_trait]
impl NodeExecutor for ForEachExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config: ForEachConfig = serde_json::from_value(node.config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;

        let items_raw = node
            .input
            .get("items")
            .cloned()
            .ok_or_else(|| NodeError::ConfigError("input.items is required".into()))?;
        let items = match resolve_value(&items_raw, registry) {
            Value::Array(items) => items,
            other => {
                return Err(NodeError::TypeError(format!(
                    "for-each items must resolve to an array, got {}",
                    crate::registry::value_type_name(&other)
                )))
            }
        };

        let total = items.len();
        let mut results = Vec::with_capacity(total);

        for (index, item) in items.iter().enumerate() {
            let mut scoped =
                ScopedRegistry::new(&mut *registry, &config.each_key, item.clone(), index);

            let mut iteration_results = Vec::with_capacity(node.each_nodes.len());
            for child in &node.each_nodes {
                let output = run_child_node(child, &mut scoped, context).await?;
                iteration_results.push(output);
            }

            results.push(json!({
                "item": item,
                "index": index,
                "results": iteration_results,
            }));

            if index + 1 < total && config.delay_between > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(config.delay_between)).await;
            }
        }

        Ok(json!({
            "total_items": total,
            "processed_items": results.len(),
            "results": results,
        }))
    }
}
