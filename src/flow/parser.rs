//! Flow parser: converts raw JSON text or an already-decoded value into
//! [`FlowSchema`].

use serde_json::Value;

use super::schema::FlowSchema;
use crate::error::FlowError;

/// Parse flow JSON text into a [`FlowSchema`].
pub fn parse_flow(content: &str) -> Result<FlowSchema, FlowError> {
    serde_json::from_str(content).map_err(|e| FlowError::ParseError(e.to_string()))
}

/// Parse an already-decoded JSON value into a [`FlowSchema`].
pub fn parse_flow_value(content: Value) -> Result<FlowSchema, FlowError> {
    serde_json::from_value(content).map_err(|e| FlowError::ParseError(e.to_string()))
}
