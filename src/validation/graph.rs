//! Pass 3: dependency-graph construction and topological ordering.
//!
//! An edge A→B exists iff B's payload carries a reference whose head is A's
//! id and whose tail begins with `output`. Plain-variable references do not
//! create edges. The emitted order is a Kahn linearization with ties broken
//! by declaration order.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use serde_json::Value;

use crate::flow::{FlowSchema, NodeKind, NodeSchema};
use crate::template::{scan_value, ReferenceToken};

use super::references::collect_descendant_ids;
use super::types::{error, ErrorCode, ValidationError};

pub fn validate(schema: &FlowSchema, errors: &mut Vec<ValidationError>) -> Vec<String> {
    let mut graph = StableDiGraph::<String, ()>::new();
    let mut index_of: HashMap<String, NodeIndex> = HashMap::new();
    let mut decl_order: HashMap<String, usize> = HashMap::new();

    for (idx, node) in schema.nodes.iter().enumerate() {
        let node_idx = graph.add_node(node.id.clone());
        index_of.insert(node.id.clone(), node_idx);
        decl_order.insert(node.id.clone(), idx);
    }

    // nested condition-branch children resolve to their top-level ancestor;
    // for-each body ids are not addressable from outside their loop
    let mut branch_ancestor: HashMap<String, String> = HashMap::new();
    let mut loop_body_ids: HashSet<String> = HashSet::new();
    for node in &schema.nodes {
        map_nested(node, &node.id, false, &mut branch_ancestor, &mut loop_body_ids);
    }

    let mut edges: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
    for (idx, node) in schema.nodes.iter().enumerate() {
        let consumer = index_of[&node.id];
        let mut internal = HashSet::new();
        collect_descendant_ids(node, &mut internal);

        for token in external_output_refs(node, &internal) {
            let producer_id = if index_of.contains_key(&token.head) {
                Some(token.head.clone())
            } else if let Some(ancestor) = branch_ancestor.get(&token.head) {
                Some(ancestor.clone())
            } else if loop_body_ids.contains(&token.head) {
                errors.push(error(
                    ErrorCode::MissingDependency,
                    format!("nodes[{}]", idx),
                    format!(
                        "reference {} names a loop-body node not visible here",
                        token.raw
                    ),
                    Some(&node.id),
                ));
                None
            } else {
                // unknown heads are reported by the reference pass
                None
            };

            if let Some(producer_id) = producer_id {
                if internal.contains(&producer_id) {
                    continue;
                }
                let producer = index_of[&producer_id];
                if edges.insert((producer, consumer)) {
                    graph.add_edge(producer, consumer, ());
                }
            }
        }
    }

    // Kahn's algorithm; the ready set pops the lowest declaration index
    let mut in_degree: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|idx| (idx, graph.neighbors_directed(idx, Direction::Incoming).count()))
        .collect();

    let mut ready: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|idx| in_degree[idx] == 0)
        .collect();
    let mut order = Vec::with_capacity(graph.node_count());

    while !ready.is_empty() {
        ready.sort_by_key(|idx| decl_order[&graph[*idx]]);
        let next = ready.remove(0);
        order.push(graph[next].clone());
        for succ in graph.neighbors_directed(next, Direction::Outgoing) {
            let deg = in_degree.get_mut(&succ).unwrap();
            *deg -= 1;
            if *deg == 0 {
                ready.push(succ);
            }
        }
    }

    if order.len() < graph.node_count() {
        let mut stuck: Vec<String> = graph
            .node_indices()
            .filter(|idx| in_degree[idx] > 0)
            .map(|idx| graph[idx].clone())
            .collect();
        stuck.sort_by_key(|id| decl_order[id]);
        errors.push(error(
            ErrorCode::CircularDependency,
            "nodes",
            format!("circular dependency among nodes: {}", stuck.join(", ")),
            stuck.first().map(String::as_str),
        ));
        return Vec::new();
    }

    order
}

fn map_nested(
    node: &NodeSchema,
    top_ancestor: &str,
    inside_loop: bool,
    branch_ancestor: &mut HashMap<String, String>,
    loop_body_ids: &mut HashSet<String>,
) {
    if let Ok(branches) = node.condition_branches() {
        for (_, branch) in branches {
            for child in &branch.nodes {
                if inside_loop {
                    loop_body_ids.insert(child.id.clone());
                } else {
                    branch_ancestor.insert(child.id.clone(), top_ancestor.to_string());
                }
                map_nested(child, top_ancestor, inside_loop, branch_ancestor, loop_body_ids);
            }
        }
    }
    for child in &node.each_nodes {
        loop_body_ids.insert(child.id.clone());
        map_nested(child, top_ancestor, true, branch_ancestor, loop_body_ids);
    }
}

/// Output-tailed references of a node's whole subtree, minus intra-subtree
/// references (scope keys and descendant node ids).
fn external_output_refs(node: &NodeSchema, internal: &HashSet<String>) -> Vec<ReferenceToken> {
    let mut tokens = Vec::new();
    let mut scope = HashSet::new();
    gather_refs(node, &mut scope, internal, &mut tokens);
    tokens
        .into_iter()
        .filter(|t| t.is_output_reference())
        .collect()
}

fn push_tokens(
    value: &Value,
    scope: &HashSet<String>,
    internal: &HashSet<String>,
    out: &mut Vec<ReferenceToken>,
) {
    for token in scan_value(value) {
        if !scope.contains(&token.head) && !internal.contains(&token.head) {
            out.push(token);
        }
    }
}

fn gather_refs(
    node: &NodeSchema,
    scope: &mut HashSet<String>,
    internal: &HashSet<String>,
    out: &mut Vec<ReferenceToken>,
) {
    push_tokens(&node.config, scope, internal, out);
    push_tokens(&node.input, scope, internal, out);
    push_tokens(&node.value, scope, internal, out);
    push_tokens(&node.messages, scope, internal, out);
    push_tokens(&node.document, scope, internal, out);

    match node.node_kind() {
        Some(NodeKind::ForEach) => {
            if let Some(each_key) = node.config.get("each_key").and_then(Value::as_str) {
                let each_key = each_key.to_string();
                let index_key = format!("{}_index", each_key);
                let added_key = scope.insert(each_key.clone());
                let added_index = scope.insert(index_key.clone());
                for child in &node.each_nodes {
                    gather_refs(child, scope, internal, out);
                }
                if added_key {
                    scope.remove(&each_key);
                }
                if added_index {
                    scope.remove(&index_key);
                }
            }
        }
        Some(NodeKind::Condition) => {
            if let Ok(branches) = node.condition_branches() {
                for (_, branch) in branches {
                    if let Some(value) = &branch.value {
                        push_tokens(value, scope, internal, out);
                    }
                    for child in &branch.nodes {
                        gather_refs(child, scope, internal, out);
                    }
                }
            }
        }
        _ => {}
    }
}
