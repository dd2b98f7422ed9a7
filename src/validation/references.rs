//! Pass 2: reference resolution with scope awareness.
//!
//! Every scanned `{{…}}` head must name a scope key in effect at the
//! reference site, a loop-body node id made visible by scope enrichment, a
//! globally addressable node id, or — when the reference has no tail — a
//! declared variable.

use std::collections::HashSet;

use serde_json::Value;

use crate::flow::{FlowSchema, NodeKind, NodeSchema};
use crate::template::scan_value;

use super::types::{error, ErrorCode, ValidationError};

pub fn validate(schema: &FlowSchema, errors: &mut Vec<ValidationError>) {
    let variables: HashSet<String> = schema.variables.iter().map(|v| v.id.clone()).collect();
    let global = global_node_ids(schema);

    let empty_scope = HashSet::new();
    let empty_body = HashSet::new();
    for (idx, node) in schema.nodes.iter().enumerate() {
        check_node(
            node,
            &format!("nodes[{}]", idx),
            &empty_scope,
            &empty_body,
            &global,
            &variables,
            errors,
        );
    }
}

/// Node ids addressable from anywhere: top-level nodes and their
/// condition-branch descendants. For-Each body ids are only visible inside
/// their loop, via scope enrichment.
pub(super) fn global_node_ids(schema: &FlowSchema) -> HashSet<String> {
    let mut out = HashSet::new();
    for node in &schema.nodes {
        add_addressable(node, false, &mut out);
    }
    out
}

fn add_addressable(node: &NodeSchema, inside_loop: bool, out: &mut HashSet<String>) {
    if !inside_loop {
        out.insert(node.id.clone());
    }
    if let Ok(branches) = node.condition_branches() {
        for (_, branch) in branches {
            for child in &branch.nodes {
                add_addressable(child, inside_loop, out);
            }
        }
    }
    for child in &node.each_nodes {
        add_addressable(child, true, out);
    }
}

/// All node ids in a subtree, including transitively nested loop bodies and
/// branch children.
pub(super) fn collect_descendant_ids(node: &NodeSchema, out: &mut HashSet<String>) {
    for child in &node.each_nodes {
        out.insert(child.id.clone());
        collect_descendant_ids(child, out);
    }
    if let Ok(branches) = node.condition_branches() {
        for (_, branch) in branches {
            for child in &branch.nodes {
                out.insert(child.id.clone());
                collect_descendant_ids(child, out);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn check_node(
    node: &NodeSchema,
    path: &str,
    scope_keys: &HashSet<String>,
    body_visible: &HashSet<String>,
    global: &HashSet<String>,
    variables: &HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    // the node's own fields are scanned under the enclosing scope
    for (field, value) in scannable_fields(node) {
        check_value(
            value,
            &format!("{}.{}", path, field),
            &node.id,
            scope_keys,
            body_visible,
            global,
            variables,
            errors,
        );
    }

    match node.node_kind() {
        Some(NodeKind::ForEach) => {
            let Some(each_key) = node.config.get("each_key").and_then(Value::as_str) else {
                return;
            };
            // the loop body sees the iteration bindings and every body node id
            let mut enriched_scope = scope_keys.clone();
            enriched_scope.insert(each_key.to_string());
            enriched_scope.insert(format!("{}_index", each_key));

            let mut enriched_body = body_visible.clone();
            collect_descendant_ids(node, &mut enriched_body);

            for (idx, child) in node.each_nodes.iter().enumerate() {
                check_node(
                    child,
                    &format!("{}.each_nodes[{}]", path, idx),
                    &enriched_scope,
                    &enriched_body,
                    global,
                    variables,
                    errors,
                );
            }
        }
        Some(NodeKind::Condition) => {
            if let Ok(branches) = node.condition_branches() {
                for (name, branch) in branches {
                    for (idx, child) in branch.nodes.iter().enumerate() {
                        check_node(
                            child,
                            &format!("{}.branches.{}.nodes[{}]", path, name, idx),
                            scope_keys,
                            body_visible,
                            global,
                            variables,
                            errors,
                        );
                    }
                }
            }
        }
        _ => {}
    }
}

/// Payload fields of a node that may carry references. Loop bodies and
/// branch node lists are walked separately, under their own scopes; the LLM
/// output schema is declarative and is not scanned.
fn scannable_fields(node: &NodeSchema) -> Vec<(&'static str, Value)> {
    let mut fields = vec![
        ("config", node.config.clone()),
        ("input", node.input.clone()),
        ("value", node.value.clone()),
        ("messages", node.messages.clone()),
        ("document", node.document.clone()),
    ];
    if node.node_kind() == Some(NodeKind::Condition) {
        if let Ok(branches) = node.condition_branches() {
            for (_, branch) in branches {
                if let Some(value) = branch.value {
                    fields.push(("branches", value));
                }
            }
        }
    }
    fields
}

#[allow(clippy::too_many_arguments)]
fn check_value(
    value: Value,
    path: &str,
    node_id: &str,
    scope_keys: &HashSet<String>,
    body_visible: &HashSet<String>,
    global: &HashSet<String>,
    variables: &HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for token in scan_value(&value) {
        let head_ok = scope_keys.contains(&token.head)
            || body_visible.contains(&token.head)
            || global.contains(&token.head)
            || (token.tail.is_empty() && variables.contains(&token.head));
        if !head_ok {
            errors.push(error(
                ErrorCode::InvalidVariableReference,
                path,
                format!("unresolvable reference: {}", token.raw),
                Some(node_id),
            ));
        }
    }
}
