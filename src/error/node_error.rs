use thiserror::Error;

use crate::providers::ProviderError;

/// Node-level errors
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Variable not found: {0}")]
    VariableNotFound(String),
    #[error("Execution error: {0}")]
    ExecutionError(String),
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Input validation error: {0}")]
    InputValidationError(String),
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),
    #[error("Output schema violation: {0}")]
    SchemaViolation(String),
    #[error("File error: {0}")]
    FileError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        NodeError::SerializationError(e.to_string())
    }
}
