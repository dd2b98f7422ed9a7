use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{NodeError, NodeResult};
use crate::executor::ExecutionContext;
use crate::flow::{NodeKind, NodeSchema};
use crate::registry::Registry;

/// Trait for node execution. Each node kind implements this.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Execute the node against the registry view, returning its output.
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value>;
}

/// Registry of node executors keyed by node kind.
pub struct NodeExecutorRegistry {
    executors: HashMap<NodeKind, Arc<dyn NodeExecutor>>,
}

impl NodeExecutorRegistry {
    pub fn new() -> Self {
        Self::with_builtins()
    }

    pub fn empty() -> Self {
        NodeExecutorRegistry {
            executors: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = NodeExecutorRegistry::empty();
        registry.register(NodeKind::Llm, Arc::new(super::llm::LlmNodeExecutor));
        registry.register(
            NodeKind::DocumentSplitter,
            Arc::new(super::document_splitter::DocumentSplitterExecutor),
        );
        registry.register(
            NodeKind::TextEmbedding,
            Arc::new(super::text_embedding::TextEmbeddingExecutor),
        );
        registry.register(
            NodeKind::VectorInsert,
            Arc::new(super::vector::VectorInsertExecutor),
        );
        registry.register(
            NodeKind::VectorSearch,
            Arc::new(super::vector::VectorSearchExecutor),
        );
        registry.register(
            NodeKind::VectorUpdate,
            Arc::new(super::vector::VectorUpdateExecutor),
        );
        registry.register(
            NodeKind::VectorDelete,
            Arc::new(super::vector::VectorDeleteExecutor),
        );
        registry.register(NodeKind::ForEach, Arc::new(super::for_each::ForEachExecutor));
        registry.register(
            NodeKind::UpdateVariable,
            Arc::new(super::update_variable::UpdateVariableExecutor),
        );
        registry.register(
            NodeKind::Condition,
            Arc::new(super::condition::ConditionExecutor),
        );
        registry
    }

    pub fn register(&mut self, kind: NodeKind, executor: Arc<dyn NodeExecutor>) {
        self.executors.insert(kind, executor);
    }

    pub fn get(&self, kind: NodeKind) -> Option<Arc<dyn NodeExecutor>> {
        self.executors.get(&kind).cloned()
    }
}

impl Default for NodeExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch one nested node (a loop-body or branch child) through the same
/// executor registry the outer driver uses, recording its output.
pub async fn run_child_node(
    child: &NodeSchema,
    registry: &mut dyn Registry,
    context: &ExecutionContext,
) -> NodeResult<Value> {
    let kind = child
        .node_kind()
        .ok_or_else(|| NodeError::ConfigError(format!("unknown node type: {}", child.kind)))?;
    let executor = context.executors.get(kind).ok_or_else(|| {
        NodeError::ExecutionError(format!("no executor for node type: {}", child.kind))
    })?;
    let output = executor.execute(child, registry, context).await?;
    registry.set_node_output(&child.id, output.clone());
    Ok(output)
}
