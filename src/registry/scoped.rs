//! Per-iteration registry overlay for For-Each bodies.

use std::collections::HashMap;

use serde_json::Value;

use super::{navigate, navigate_output, Registry};
use crate::error::NodeResult;

/// A delegating view over a parent registry, alive for exactly one loop
/// iteration. It binds the loop's `each_key` and `each_key_index`, keeps an
/// iteration-private node-output store (written through to the parent), and
/// forwards everything else unchanged.
pub struct ScopedRegistry<'a> {
    parent: &'a mut dyn Registry,
    each_key: String,
    index_key: String,
    item: Value,
    index: usize,
    local_outputs: HashMap<String, Value>,
}

impl<'a> ScopedRegistry<'a> {
    pub fn new(parent: &'a mut dyn Registry, each_key: &str, item: Value, index: usize) -> Self {
        ScopedRegistry {
            parent,
            each_key: each_key.to_string(),
            index_key: format!("{}_index", each_key),
            item,
            index,
            local_outputs: HashMap::new(),
        }
    }
}

impl Registry for ScopedRegistry<'_> {
    fn set_variable(&mut self, id: &str, value: Value) -> NodeResult<()> {
        // Variable mutations inside a loop are globally visible so that
        // append/join accumulate across iterations.
        self.parent.set_variable(id, value)
    }

    fn get_variable(&self, id: &str) -> Option<Value> {
        if id == self.each_key {
            return Some(self.item.clone());
        }
        if id == self.index_key {
            return Some(Value::from(self.index));
        }
        self.parent.get_variable(id)
    }

    fn has_variable(&self, id: &str) -> bool {
        id == self.each_key || id == self.index_key || self.parent.has_variable(id)
    }

    fn set_node_output(&mut self, id: &str, value: Value) {
        self.local_outputs.insert(id.to_string(), value.clone());
        self.parent.set_node_output(id, value);
    }

    fn get_node_output(&self, id: &str) -> Option<Value> {
        self.local_outputs
            .get(id)
            .cloned()
            .or_else(|| self.parent.get_node_output(id))
    }

    fn has_node_output(&self, id: &str) -> bool {
        self.local_outputs.contains_key(id) || self.parent.has_node_output(id)
    }

    fn resolve_expression(&self, dotted: &str) -> Option<Value> {
        let mut segments = dotted.split('.');
        let head = segments.next()?;
        let tail: Vec<&str> = segments.collect();

        if head == self.each_key {
            return navigate(&self.item, &tail);
        }
        if head == self.index_key {
            return navigate(&Value::from(self.index), &tail);
        }
        if let Some(output) = self.local_outputs.get(head) {
            return navigate_output(output, &tail);
        }
        self.parent.resolve_expression(dotted)
    }
}
