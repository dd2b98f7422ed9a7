//! Pass 5: advisory findings — empty bodies and complexity bucketing.

use crate::flow::{FlowSchema, NodeKind, NodeSchema};

use super::types::{warn, ValidationWarning};

pub fn validate(schema: &FlowSchema, warnings: &mut Vec<ValidationWarning>) {
    if schema.nodes.is_empty() {
        warnings.push(warn("nodes", "flow has no nodes"));
    }

    for (idx, node) in schema.nodes.iter().enumerate() {
        check_empty_bodies(node, &format!("nodes[{}]", idx), warnings);
    }

    let total = total_node_count(schema);
    let bucket = complexity_bucket(total);
    tracing::debug!(nodes = total, complexity = bucket, "flow complexity");
    if bucket == "high" {
        warnings.push(warn(
            "nodes",
            format!("flow complexity is high ({} nodes)", total),
        ));
    }
}

fn check_empty_bodies(node: &NodeSchema, path: &str, warnings: &mut Vec<ValidationWarning>) {
    if node.node_kind() == Some(NodeKind::ForEach) && node.each_nodes.is_empty() {
        warnings.push(warn(
            format!("{}.each_nodes", path),
            format!("for-each node '{}' has an empty body", node.id),
        ));
    }
    for (idx, child) in node.each_nodes.iter().enumerate() {
        check_empty_bodies(child, &format!("{}.each_nodes[{}]", path, idx), warnings);
    }
    if let Ok(branches) = node.condition_branches() {
        for (name, branch) in branches {
            for (idx, child) in branch.nodes.iter().enumerate() {
                check_empty_bodies(
                    child,
                    &format!("{}.branches.{}.nodes[{}]", path, name, idx),
                    warnings,
                );
            }
        }
    }
}

fn total_node_count(schema: &FlowSchema) -> usize {
    fn count(node: &NodeSchema) -> usize {
        let mut total = 1;
        for child in &node.each_nodes {
            total += count(child);
        }
        if let Ok(branches) = node.condition_branches() {
            for (_, branch) in branches {
                for child in &branch.nodes {
                    total += count(child);
                }
            }
        }
        total
    }
    schema.nodes.iter().map(count).sum()
}

fn complexity_bucket(total: usize) -> &'static str {
    match total {
        0..=10 => "low",
        11..=25 => "medium",
        _ => "high",
    }
}
