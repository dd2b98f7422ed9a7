//! Flow-level error types.

use super::NodeError;
use crate::validation::ValidationReport;
use thiserror::Error;

/// Flow-level errors
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Flow parse error: {0}")]
    ParseError(String),
    #[error("Flow validation failed: {}", first_error_message(.0))]
    ValidationFailed(Box<ValidationReport>),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Node executor not found for type: {0}")]
    ExecutorNotFound(String),
    #[error("Invalid input for variable '{variable_id}': {error}")]
    InvalidInput {
        variable_id: String,
        error: NodeError,
    },
    #[error("Node execution error: node={node_id}, error={error}")]
    NodeExecutionError { node_id: String, error: NodeError },
    #[error("Executor is shutting down")]
    ShuttingDown,
    #[error("Internal error: {0}")]
    InternalError(String),
}

fn first_error_message(report: &ValidationReport) -> String {
    report
        .errors
        .first()
        .map(|e| format!("[{}] {}: {}", e.code.as_str(), e.path, e.message))
        .unwrap_or_else(|| "unknown error".to_string())
}
