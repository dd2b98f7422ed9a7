//! Validation diagnostics and the aggregated report.

use serde::{Deserialize, Serialize};

/// Stable, closed set of validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    InvalidFormat,
    InvalidType,
    MissingRequiredField,
    InvalidNodeType,
    DuplicateNodeId,
    DuplicateVariableId,
    InvalidVariableReference,
    CircularDependency,
    MissingDependency,
    MissingProviderConfig,
    InvalidValue,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidFormat => "invalid-format",
            ErrorCode::InvalidType => "invalid-type",
            ErrorCode::MissingRequiredField => "missing-required-field",
            ErrorCode::InvalidNodeType => "invalid-node-type",
            ErrorCode::DuplicateNodeId => "duplicate-node-id",
            ErrorCode::DuplicateVariableId => "duplicate-variable-id",
            ErrorCode::InvalidVariableReference => "invalid-variable-reference",
            ErrorCode::CircularDependency => "circular-dependency",
            ErrorCode::MissingDependency => "missing-dependency",
            ErrorCode::MissingProviderConfig => "missing-provider-config",
            ErrorCode::InvalidValue => "invalid-value",
        }
    }
}

/// A single validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: ErrorCode,
    /// Location of the finding in the document (`nodes[2].config.provider`).
    pub path: String,
    pub message: String,
    #[serde(default)]
    pub node_id: Option<String>,
}

/// An advisory validation warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

/// Aggregated result of flow validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    /// Topologically ordered top-level node ids; empty when validation
    /// failed before an order could be established.
    pub execution_order: Vec<String>,
}

impl ValidationReport {
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

pub(super) fn error(
    code: ErrorCode,
    path: impl Into<String>,
    message: impl Into<String>,
    node_id: Option<&str>,
) -> ValidationError {
    ValidationError {
        code,
        path: path.into(),
        message: message.into(),
        node_id: node_id.map(|s| s.to_string()),
    }
}

pub(super) fn warn(path: impl Into<String>, message: impl Into<String>) -> ValidationWarning {
    ValidationWarning {
        path: path.into(),
        message: message.into(),
    }
}
