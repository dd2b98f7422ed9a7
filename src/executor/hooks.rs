//! Lifecycle hook protocol: observation and controlled interruption.
//!
//! Hooks are caller-supplied. A failing hook is logged as a warning and
//! never disturbs the flow; control signals come only from successful
//! `after_node` / `on_error` returns.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::NodeError;

/// Control signal returned by `after_node` and `on_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookSignal {
    Continue,
    Stop,
}

/// Node identification handed to every hook invocation.
#[derive(Debug, Clone)]
pub struct NodeEvent {
    pub flow_id: String,
    pub node_id: String,
    pub node_kind: String,
    pub node_name: String,
}

#[async_trait]
pub trait FlowHooks: Send + Sync {
    async fn before_node(&self, _event: &NodeEvent) -> Result<(), String> {
        Ok(())
    }

    /// `Stop` short-circuits the rest of the flow with a success result
    /// computed from the outputs so far.
    async fn after_node(&self, _event: &NodeEvent, _output: &Value) -> Result<HookSignal, String> {
        Ok(HookSignal::Continue)
    }

    /// `Continue` skips the failed node and proceeds; `Stop` fails the flow
    /// with the error as cause.
    async fn on_error(&self, _event: &NodeEvent, _error: &NodeError) -> Result<HookSignal, String> {
        Ok(HookSignal::Stop)
    }

    async fn on_complete(
        &self,
        _flow_id: &str,
        _outputs: &HashMap<String, Value>,
    ) -> Result<(), String> {
        Ok(())
    }
}

/// Default no-op hooks.
pub struct NoopHooks;

#[async_trait]
impl FlowHooks for NoopHooks {}
