//! Per-flow execution state: variables and node outputs.
//!
//! A [`FlowRegistry`] is created when a flow is admitted and torn down when
//! it completes. Node executors see it behind the [`Registry`] trait so that
//! For-Each iterations can substitute a [`ScopedRegistry`] overlay without
//! the executors noticing.

pub mod scoped;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{NodeError, NodeResult};
use crate::files::FlowFileStore;
use crate::flow::VariableDef;

pub use scoped::ScopedRegistry;
pub use types::{navigate, navigate_path, VarType};

/// Read/write view over flow state. Implemented by [`FlowRegistry`] and by
/// the per-iteration [`ScopedRegistry`] overlay.
pub trait Registry: Send {
    fn set_variable(&mut self, id: &str, value: Value) -> NodeResult<()>;
    fn get_variable(&self, id: &str) -> Option<Value>;
    fn has_variable(&self, id: &str) -> bool;

    fn set_node_output(&mut self, id: &str, value: Value);
    fn get_node_output(&self, id: &str) -> Option<Value>;
    fn has_node_output(&self, id: &str) -> bool;

    /// Resolve a dotted expression (`head(.tail)*`). Node outputs win over
    /// variables when the head is ambiguous; a leading `output` tail segment
    /// addresses the recorded output value itself.
    fn resolve_expression(&self, dotted: &str) -> Option<Value>;
}

/// The root per-flow registry.
pub struct FlowRegistry {
    vars: HashMap<String, Value>,
    outputs: HashMap<String, Value>,
    var_types: HashMap<String, VarType>,
    files: Arc<FlowFileStore>,
}

impl FlowRegistry {
    pub fn new(files: Arc<FlowFileStore>) -> Self {
        FlowRegistry {
            vars: HashMap::new(),
            outputs: HashMap::new(),
            var_types: HashMap::new(),
            files,
        }
    }

    /// Seed declared variables: record types, apply defaults.
    pub fn seed_declarations(&mut self, declarations: &[VariableDef]) -> NodeResult<()> {
        for decl in declarations {
            if let Some(t) = decl.var_type {
                self.var_types.insert(decl.id.clone(), t);
            }
            if let Some(default) = &decl.default {
                self.set_variable(&decl.id, default.clone())?;
            }
        }
        Ok(())
    }

    pub fn declared_type(&self, id: &str) -> Option<VarType> {
        self.var_types.get(id).copied()
    }

    fn check_type(&self, id: &str, value: &Value) -> NodeResult<()> {
        if let Some(t) = self.var_types.get(id) {
            if !t.matches(value) {
                return Err(NodeError::TypeError(format!(
                    "variable '{}' expects {}, got {}",
                    id,
                    t.as_str(),
                    value_type_name(value)
                )));
            }
        }
        Ok(())
    }

    /// For a `file`-typed variable, a string that is not a known file handle
    /// is treated as a filesystem path and registered through the file
    /// store; the stored value becomes the returned handle id.
    fn coerce_file(&self, id: &str, value: Value) -> NodeResult<Value> {
        let Some(VarType::File) = self.var_types.get(id) else {
            return Ok(value);
        };
        let Value::String(s) = &value else {
            return Err(NodeError::TypeError(format!(
                "variable '{}' expects file, got {}",
                id,
                value_type_name(&value)
            )));
        };
        if self.files.has_file(s) {
            return Ok(value);
        }
        let entry = self.files.register_file(s).map_err(|e| {
            NodeError::FileError(format!(
                "failed to register file for variable '{}' from path '{}': {}",
                id, s, e
            ))
        })?;
        Ok(Value::String(entry.id))
    }
}

impl Registry for FlowRegistry {
    fn set_variable(&mut self, id: &str, value: Value) -> NodeResult<()> {
        let value = self.coerce_file(id, value)?;
        self.check_type(id, &value)?;
        self.vars.insert(id.to_string(), value);
        Ok(())
    }

    fn get_variable(&self, id: &str) -> Option<Value> {
        self.vars.get(id).cloned()
    }

    fn has_variable(&self, id: &str) -> bool {
        self.vars.contains_key(id)
    }

    fn set_node_output(&mut self, id: &str, value: Value) {
        self.outputs.insert(id.to_string(), value);
    }

    fn get_node_output(&self, id: &str) -> Option<Value> {
        self.outputs.get(id).cloned()
    }

    fn has_node_output(&self, id: &str) -> bool {
        self.outputs.contains_key(id)
    }

    fn resolve_expression(&self, dotted: &str) -> Option<Value> {
        let mut segments = dotted.split('.');
        let head = segments.next()?;
        let tail: Vec<&str> = segments.collect();

        if let Some(output) = self.outputs.get(head) {
            return navigate_output(output, &tail);
        }
        let var = self.vars.get(head)?;
        navigate(var, &tail)
    }
}

/// Navigate into a recorded node output. The first `output` segment refers
/// to the output value itself, so `{{n.output}}` is the whole value and
/// `{{n.output.text}}` descends into it.
pub(crate) fn navigate_output(output: &Value, tail: &[&str]) -> Option<Value> {
    let rest = match tail.first() {
        Some(&"output") => &tail[1..],
        _ => tail,
    };
    navigate(output, rest)
}

pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
