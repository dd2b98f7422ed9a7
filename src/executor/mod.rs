//! Flow executor: admission under a global concurrency bound, sequential
//! node driving, hook dispatch, and output collection.

mod context;
mod hooks;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::config::HostConfig;
use crate::error::{FlowError, FlowResult};
use crate::files::FlowFileStore;
use crate::flow::{parse_flow_value, FlowSchema};
use crate::nodes::NodeExecutorRegistry;
use crate::providers::ProviderRegistry;
use crate::registry::{FlowRegistry, Registry};
use crate::validation::validate_flow;

pub use context::ExecutionContext;
pub use hooks::{FlowHooks, HookSignal, NodeEvent, NoopHooks};

/// Result of a completed flow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(rename = "flowId")]
    pub flow_id: String,
    /// Wall-clock execution time in milliseconds.
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,
    pub outputs: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Schedules flow runs under a global parallelism bound and drives each
/// flow's nodes in validated order.
pub struct FlowExecutor {
    config: HostConfig,
    providers: Arc<ProviderRegistry>,
    executors: Arc<NodeExecutorRegistry>,
    files: Arc<FlowFileStore>,
    slots: Arc<Semaphore>,
    job_counter: AtomicU64,
    accepting: AtomicBool,
}

impl FlowExecutor {
    pub fn new(config: HostConfig, providers: ProviderRegistry) -> FlowResult<Self> {
        config.validate()?;
        let limit = config.concurrency.global_limit;
        Ok(FlowExecutor {
            config,
            providers: Arc::new(providers),
            executors: Arc::new(NodeExecutorRegistry::new()),
            files: Arc::new(FlowFileStore::new()),
            slots: Arc::new(Semaphore::new(limit)),
            job_counter: AtomicU64::new(0),
            accepting: AtomicBool::new(true),
        })
    }

    pub fn files(&self) -> Arc<FlowFileStore> {
        self.files.clone()
    }

    /// Run a flow with default (no-op) hooks.
    pub async fn run(
        &self,
        flow: Value,
        inputs: HashMap<String, Value>,
    ) -> FlowResult<ExecutionResult> {
        self.run_with_hooks(flow, inputs, Arc::new(NoopHooks)).await
    }

    /// Validate, enqueue, and run a flow, invoking the supplied hooks around
    /// node and flow events.
    pub async fn run_with_hooks(
        &self,
        flow: Value,
        inputs: HashMap<String, Value>,
        hooks: Arc<dyn FlowHooks>,
    ) -> FlowResult<ExecutionResult> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(FlowError::ShuttingDown);
        }

        let schema = parse_flow_value(flow)?;
        let settings = if self.config.providers.is_empty() {
            None
        } else {
            Some(&self.config.providers)
        };
        let report = validate_flow(&schema, settings);
        if !report.is_valid {
            return Err(FlowError::ValidationFailed(Box::new(report)));
        }

        let flow_id = format!(
            "flow-{}-{}",
            self.job_counter.fetch_add(1, Ordering::SeqCst),
            now_millis()
        );

        let _permit = self
            .slots
            .acquire()
            .await
            .map_err(|_| FlowError::ShuttingDown)?;
        // queued jobs admitted during shutdown are rejected
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(FlowError::ShuttingDown);
        }

        let started = Instant::now();
        let outputs = self
            .execute_flow(&schema, &report.execution_order, inputs, &flow_id, hooks)
            .await?;

        Ok(ExecutionResult {
            success: true,
            flow_id,
            execution_time_ms: started.elapsed().as_millis() as u64,
            outputs,
            error: None,
        })
    }

    async fn execute_flow(
        &self,
        schema: &FlowSchema,
        order: &[String],
        inputs: HashMap<String, Value>,
        flow_id: &str,
        hooks: Arc<dyn FlowHooks>,
    ) -> FlowResult<HashMap<String, Value>> {
        let mut registry = FlowRegistry::new(self.files.clone());
        registry
            .seed_declarations(&schema.variables)
            .map_err(|e| FlowError::InvalidConfig(format!("variable default: {}", e)))?;
        for (id, value) in inputs {
            registry
                .set_variable(&id, value)
                .map_err(|error| FlowError::InvalidInput {
                    variable_id: id.clone(),
                    error,
                })?;
        }

        let context = ExecutionContext::new(
            flow_id.to_string(),
            self.executors.clone(),
            self.providers.clone(),
            self.files.clone(),
        );
        let node_map: HashMap<&str, &crate::flow::NodeSchema> =
            schema.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        for node_id in order {
            let node = node_map.get(node_id.as_str()).ok_or_else(|| {
                FlowError::InternalError(format!("ordered node '{}' not found", node_id))
            })?;
            let event = NodeEvent {
                flow_id: flow_id.to_string(),
                node_id: node.id.clone(),
                node_kind: node.kind.clone(),
                node_name: node.name.clone(),
            };

            if let Err(message) = hooks.before_node(&event).await {
                tracing::warn!(node_id = %node.id, %message, "before_node hook failed");
            }

            let kind = node
                .node_kind()
                .ok_or_else(|| FlowError::ExecutorNotFound(node.kind.clone()))?;
            let executor = self
                .executors
                .get(kind)
                .ok_or_else(|| FlowError::ExecutorNotFound(node.kind.clone()))?;

            match executor.execute(node, &mut registry, &context).await {
                Ok(output) => {
                    registry.set_node_output(&node.id, output.clone());
                    match hooks.after_node(&event, &output).await {
                        Ok(HookSignal::Stop) => {
                            tracing::debug!(node_id = %node.id, "flow stopped by after_node hook");
                            break;
                        }
                        Ok(HookSignal::Continue) => {}
                        Err(message) => {
                            tracing::warn!(node_id = %node.id, %message, "after_node hook failed");
                        }
                    }
                }
                Err(error) => match hooks.on_error(&event, &error).await {
                    Ok(HookSignal::Continue) => {
                        tracing::warn!(
                            node_id = %node.id,
                            %error,
                            "node failed; continuing without its output"
                        );
                    }
                    Ok(HookSignal::Stop) => {
                        return Err(FlowError::NodeExecutionError {
                            node_id: node.id.clone(),
                            error,
                        });
                    }
                    Err(message) => {
                        tracing::warn!(node_id = %node.id, %message, "on_error hook failed");
                        return Err(FlowError::NodeExecutionError {
                            node_id: node.id.clone(),
                            error,
                        });
                    }
                },
            }
        }

        // declared outputs read variables, not node outputs
        let mut outputs = HashMap::new();
        for id in &schema.output {
            outputs.insert(
                id.clone(),
                registry.get_variable(id).unwrap_or(Value::Null),
            );
        }

        if let Err(message) = hooks.on_complete(flow_id, &outputs).await {
            tracing::warn!(%flow_id, %message, "on_complete hook failed");
        }

        Ok(outputs)
    }

    /// Reject queued jobs and wait up to `grace` for running flows.
    pub async fn shutdown(&self, grace: Duration) {
        self.accepting.store(false, Ordering::SeqCst);
        let limit = self.config.concurrency.global_limit as u32;
        match tokio::time::timeout(grace, self.slots.acquire_many(limit)).await {
            Ok(Ok(_permits)) => {}
            _ => {
                tracing::warn!(
                    grace_ms = grace.as_millis() as u64,
                    "shutdown grace period elapsed with flows still running"
                );
            }
        }
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
