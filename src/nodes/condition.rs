//! Condition node: first-match branch selection over a switch value.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{NodeError, NodeResult};
use crate::evaluator::ComparisonOperator;
use crate::executor::ExecutionContext;
use crate::flow::NodeSchema;
use crate::registry::Registry;
use crate::template::resolve_value;

use super::executor::{run_child_node, NodeExecutor};

pub struct ConditionExecutor;

#[async_trait]
impl NodeExecutor for ConditionExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let switch_raw = node
            .input
            .get("switch_value")
            .cloned()
            .ok_or_else(|| NodeError::ConfigError("input.switch_value is required".into()))?;
        let switch_value = resolve_value(&switch_raw, registry);

        let branches = node
            .condition_branches()
            .map_err(NodeError::ConfigError)?;

        let mut matched: Option<String> = None;
        for (name, branch) in &branches {
            if name == "default" {
                continue;
            }
            let operator = branch
                .condition
                .as_deref()
                .ok_or_else(|| {
                    NodeError::ConfigError(format!("branch '{}' has no condition", name))
                })
                .and_then(ComparisonOperator::parse)?;
            let target = branch
                .value
                .as_ref()
                .map(|v| resolve_value(v, registry))
                .unwrap_or(Value::Null);
            if operator.evaluate(&switch_value, &target) {
                matched = Some(name.clone());
                break;
            }
        }

        if matched.is_none() && branches.iter().any(|(name, _)| name == "default") {
            matched = Some("default".to_string());
        }

        let mut results = Vec::new();
        if let Some(branch_name) = &matched {
            let (_, branch) = branches
                .iter()
                .find(|(name, _)| name == branch_name)
                .expect("matched branch exists");
            // branch bodies run against the same registry, no scope overlay
            for child in &branch.nodes {
                let output = run_child_node(child, registry, context).await?;
                results.push(output);
            }
        }

        Ok(json!({
            "matched_branch": matched,
            "results": results,
        }))
    }
}
