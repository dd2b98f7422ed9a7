//! Typed model of the flow JSON document.
//!
//! The header and node envelopes are typed; kind-specific payloads stay as
//! raw [`serde_json::Value`] and are deserialized into their config structs
//! inside the matching node executor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::VarType;

/// A parsed flow document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSchema {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub variables: Vec<VariableDef>,
    /// Declared input variable ids.
    #[serde(default)]
    pub input: Vec<String>,
    /// Declared output variable ids.
    #[serde(default)]
    pub output: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<NodeSchema>,
}

/// A flow-level variable declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDef {
    pub id: String,
    #[serde(rename = "type", default)]
    pub var_type: Option<VarType>,
    #[serde(default)]
    pub default: Option<Value>,
}

/// A single node envelope. `kind` is kept as a raw string so that unknown
/// types surface as validation diagnostics instead of parse failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSchema {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub input: Value,
    /// Update-Variable payload.
    #[serde(default)]
    pub value: Value,
    /// LLM conversation messages.
    #[serde(default)]
    pub messages: Value,
    /// LLM declared output schema.
    #[serde(default)]
    pub output: Value,
    /// Document-Splitter source document reference.
    #[serde(default)]
    pub document: Value,
    /// Condition branch map (insertion order preserved).
    #[serde(default)]
    pub branches: Value,
    /// For-Each loop body.
    #[serde(default)]
    pub each_nodes: Vec<NodeSchema>,
}

impl NodeSchema {
    pub fn node_kind(&self) -> Option<NodeKind> {
        NodeKind::from_str(&self.kind)
    }

    /// Parse the Condition branch map, preserving declaration order.
    pub fn condition_branches(&self) -> Result<Vec<(String, BranchSchema)>, String> {
        match &self.branches {
            Value::Object(map) => map
                .iter()
                .map(|(name, raw)| {
                    serde_json::from_value::<BranchSchema>(raw.clone())
                        .map(|branch| (name.clone(), branch))
                        .map_err(|e| format!("branch '{}': {}", name, e))
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            _ => Err("branches must be an object".to_string()),
        }
    }
}

/// One Condition branch: an optional `(operator, value)` pair and the nodes
/// executed when the branch fires. The reserved name `default` carries no
/// condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSchema {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub nodes: Vec<NodeSchema>,
}

/// Closed set of node kinds the runtime executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Llm,
    DocumentSplitter,
    TextEmbedding,
    VectorInsert,
    VectorSearch,
    VectorUpdate,
    VectorDelete,
    ForEach,
    UpdateVariable,
    Condition,
}

impl NodeKind {
    pub fn from_str(kind: &str) -> Option<Self> {
        match kind {
            "LLM" => Some(NodeKind::Llm),
            "DOCUMENT_SPLITTER" => Some(NodeKind::DocumentSplitter),
            "TEXT_EMBEDDING" => Some(NodeKind::TextEmbedding),
            "VECTOR_INSERT" => Some(NodeKind::VectorInsert),
            "VECTOR_SEARCH" => Some(NodeKind::VectorSearch),
            "VECTOR_UPDATE" => Some(NodeKind::VectorUpdate),
            "VECTOR_DELETE" => Some(NodeKind::VectorDelete),
            "FOR_EACH" => Some(NodeKind::ForEach),
            "UPDATE_VARIABLE" => Some(NodeKind::UpdateVariable),
            "CONDITION" => Some(NodeKind::Condition),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Llm => "LLM",
            NodeKind::DocumentSplitter => "DOCUMENT_SPLITTER",
            NodeKind::TextEmbedding => "TEXT_EMBEDDING",
            NodeKind::VectorInsert => "VECTOR_INSERT",
            NodeKind::VectorSearch => "VECTOR_SEARCH",
            NodeKind::VectorUpdate => "VECTOR_UPDATE",
            NodeKind::VectorDelete => "VECTOR_DELETE",
            NodeKind::ForEach => "FOR_EACH",
            NodeKind::UpdateVariable => "UPDATE_VARIABLE",
            NodeKind::Condition => "CONDITION",
        }
    }

    /// Provider category the kind draws credentials from, if any.
    pub fn provider_category(&self) -> Option<&'static str> {
        match self {
            NodeKind::Llm => Some("llm"),
            NodeKind::TextEmbedding => Some("embedding"),
            NodeKind::VectorInsert
            | NodeKind::VectorSearch
            | NodeKind::VectorUpdate
            | NodeKind::VectorDelete => Some("vector"),
            _ => None,
        }
    }
}
