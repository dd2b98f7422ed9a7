//! Per-run context bundle handed to node executors.

use std::sync::Arc;

use crate::files::FlowFileStore;
use crate::nodes::NodeExecutorRegistry;
use crate::providers::ProviderRegistry;

/// Everything a node executor needs besides the registry: the run id, the
/// executor registry for nested dispatch, provider adapters, and the file
/// store.
#[derive(Clone)]
pub struct ExecutionContext {
    pub flow_id: String,
    pub executors: Arc<NodeExecutorRegistry>,
    pub providers: Arc<ProviderRegistry>,
    pub files: Arc<FlowFileStore>,
}

impl ExecutionContext {
    pub fn new(
        flow_id: String,
        executors: Arc<NodeExecutorRegistry>,
        providers: Arc<ProviderRegistry>,
        files: Arc<FlowFileStore>,
    ) -> Self {
        ExecutionContext {
            flow_id,
            executors,
            providers,
            files,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        ExecutionContext::new(
            "flow-test".to_string(),
            Arc::new(NodeExecutorRegistry::new()),
            Arc::new(ProviderRegistry::new()),
            Arc::new(FlowFileStore::new()),
        )
    }
}
