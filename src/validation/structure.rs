//! Pass 1: structural checks on the flow document.

use std::collections::HashSet;

use serde_json::Value;

use crate::flow::{FlowSchema, NodeKind, NodeSchema};

use super::types::{error, warn, ErrorCode, ValidationError, ValidationWarning};

const UPDATE_OPERATIONS: &[&str] = &[
    "update", "join", "append", "extract", "pick", "omit", "map", "filter", "slice", "flatten",
    "concat",
];

pub fn validate(
    schema: &FlowSchema,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) {
    if schema.name.trim().is_empty() {
        errors.push(error(
            ErrorCode::MissingRequiredField,
            "name",
            "flow name is required",
            None,
        ));
    }
    if semver::Version::parse(&schema.version).is_err() {
        errors.push(error(
            ErrorCode::InvalidValue,
            "version",
            format!("'{}' is not a semantic version", schema.version),
            None,
        ));
    }

    let mut variable_ids = HashSet::new();
    for (idx, var) in schema.variables.iter().enumerate() {
        let path = format!("variables[{}]", idx);
        if var.id.trim().is_empty() {
            errors.push(error(
                ErrorCode::MissingRequiredField,
                format!("{}.id", path),
                "variable id is required",
                None,
            ));
            continue;
        }
        if !variable_ids.insert(var.id.clone()) {
            errors.push(error(
                ErrorCode::DuplicateVariableId,
                format!("{}.id", path),
                format!("duplicate variable id: {}", var.id),
                None,
            ));
        }
    }

    for (field, ids) in [("input", &schema.input), ("output", &schema.output)] {
        for (idx, id) in ids.iter().enumerate() {
            if !variable_ids.contains(id) {
                errors.push(error(
                    ErrorCode::InvalidVariableReference,
                    format!("{}[{}]", field, idx),
                    format!("declared {} '{}' is not a declared variable", field, id),
                    None,
                ));
            }
        }
    }

    let mut node_ids = HashSet::new();
    for (idx, node) in schema.nodes.iter().enumerate() {
        check_node(
            node,
            &format!("nodes[{}]", idx),
            &mut node_ids,
            errors,
            warnings,
        );
    }
}

/// Check a node envelope and its kind payload; recurse into nested bodies so
/// that node-id uniqueness holds across the whole flow.
fn check_node(
    node: &NodeSchema,
    path: &str,
    seen_ids: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) {
    if node.id.trim().is_empty() {
        errors.push(error(
            ErrorCode::MissingRequiredField,
            format!("{}.id", path),
            "node id is required",
            None,
        ));
    } else if !seen_ids.insert(node.id.clone()) {
        errors.push(error(
            ErrorCode::DuplicateNodeId,
            format!("{}.id", path),
            format!("duplicate node id: {}", node.id),
            Some(&node.id),
        ));
    }

    if node.name.trim().is_empty() {
        warnings.push(warn(format!("{}.name", path), "node name is empty"));
    }

    let Some(kind) = node.node_kind() else {
        errors.push(error(
            ErrorCode::InvalidNodeType,
            format!("{}.type", path),
            format!("unknown node type: {}", node.kind),
            Some(&node.id),
        ));
        return;
    };

    match kind {
        NodeKind::Llm => check_llm(node, path, errors),
        NodeKind::DocumentSplitter => check_splitter(node, path, errors),
        NodeKind::TextEmbedding => check_embedding(node, path, errors),
        NodeKind::VectorInsert
        | NodeKind::VectorSearch
        | NodeKind::VectorUpdate
        | NodeKind::VectorDelete => check_vector(node, path, errors),
        NodeKind::ForEach => check_for_each(node, path, seen_ids, errors, warnings),
        NodeKind::UpdateVariable => check_update_variable(node, path, errors),
        NodeKind::Condition => check_condition(node, path, seen_ids, errors, warnings),
    }
}

fn require_config_string(
    node: &NodeSchema,
    path: &str,
    field: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match node.config.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(value) if !value.is_null() => {
            errors.push(error(
                ErrorCode::InvalidType,
                format!("{}.config.{}", path, field),
                format!("config.{} must be a string", field),
                Some(&node.id),
            ));
            None
        }
        _ => {
            errors.push(error(
                ErrorCode::MissingRequiredField,
                format!("{}.config.{}", path, field),
                format!("config.{} is required", field),
                Some(&node.id),
            ));
            None
        }
    }
}

fn check_llm(node: &NodeSchema, path: &str, errors: &mut Vec<ValidationError>) {
    require_config_string(node, path, "provider", errors);
    require_config_string(node, path, "model", errors);

    match &node.messages {
        Value::Array(messages) if !messages.is_empty() => {}
        Value::Array(_) => errors.push(error(
            ErrorCode::MissingRequiredField,
            format!("{}.messages", path),
            "messages must not be empty",
            Some(&node.id),
        )),
        _ => errors.push(error(
            ErrorCode::InvalidType,
            format!("{}.messages", path),
            "messages must be an array",
            Some(&node.id),
        )),
    }

    match &node.output {
        Value::Object(fields) if !fields.is_empty() => {}
        _ => errors.push(error(
            ErrorCode::MissingRequiredField,
            format!("{}.output", path),
            "an output schema is required",
            Some(&node.id),
        )),
    }
}

fn check_splitter(node: &NodeSchema, path: &str, errors: &mut Vec<ValidationError>) {
    if node.document.is_null() {
        errors.push(error(
            ErrorCode::MissingRequiredField,
            format!("{}.document", path),
            "document is required",
            Some(&node.id),
        ));
    }
    if let Some(Value::String(format)) = node.config.get("image_format") {
        if !matches!(format.as_str(), "png" | "jpg" | "webp") {
            errors.push(error(
                ErrorCode::InvalidValue,
                format!("{}.config.image_format", path),
                format!("image_format must be png, jpg, or webp, got '{}'", format),
                Some(&node.id),
            ));
        }
    }
    if let Some(Value::String(quality)) = node.config.get("image_quality") {
        if !matches!(quality.as_str(), "low" | "medium" | "high") {
            errors.push(error(
                ErrorCode::InvalidValue,
                format!("{}.config.image_quality", path),
                format!("image_quality must be low, medium, or high, got '{}'", quality),
                Some(&node.id),
            ));
        }
    }
}

fn check_embedding(node: &NodeSchema, path: &str, errors: &mut Vec<ValidationError>) {
    require_config_string(node, path, "provider", errors);
    require_config_string(node, path, "model", errors);
    let has_input = ["text", "texts", "items"]
        .iter()
        .any(|f| node.input.get(f).map(|v| !v.is_null()).unwrap_or(false));
    if !has_input {
        errors.push(error(
            ErrorCode::MissingRequiredField,
            format!("{}.input", path),
            "one of input.text, input.texts, or input.items is required",
            Some(&node.id),
        ));
    }
}

fn check_vector(node: &NodeSchema, path: &str, errors: &mut Vec<ValidationError>) {
    require_config_string(node, path, "provider", errors);
    require_config_string(node, path, "index_name", errors);
}

fn check_for_each(
    node: &NodeSchema,
    path: &str,
    seen_ids: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) {
    require_config_string(node, path, "each_key", errors);
    if node.input.get("items").map(Value::is_null).unwrap_or(true) {
        errors.push(error(
            ErrorCode::MissingRequiredField,
            format!("{}.input.items", path),
            "input.items is required",
            Some(&node.id),
        ));
    }
    if let Some(delay) = node.config.get("delay_between") {
        if delay.as_u64().is_none() {
            errors.push(error(
                ErrorCode::InvalidValue,
                format!("{}.config.delay_between", path),
                "delay_between must be a non-negative integer",
                Some(&node.id),
            ));
        }
    }
    for (idx, child) in node.each_nodes.iter().enumerate() {
        check_node(
            child,
            &format!("{}.each_nodes[{}]", path, idx),
            seen_ids,
            errors,
            warnings,
        );
    }
}

fn check_update_variable(node: &NodeSchema, path: &str, errors: &mut Vec<ValidationError>) {
    require_config_string(node, path, "variable_id", errors);
    if let Some(op) = require_config_string(node, path, "type", errors) {
        if !UPDATE_OPERATIONS.contains(&op.as_str()) {
            errors.push(error(
                ErrorCode::InvalidValue,
                format!("{}.config.type", path),
                format!("unknown update operation: {}", op),
                Some(&node.id),
            ));
        }
    }
}

fn check_condition(
    node: &NodeSchema,
    path: &str,
    seen_ids: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
    warnings: &mut Vec<ValidationWarning>,
) {
    if node
        .input
        .get("switch_value")
        .map(Value::is_null)
        .unwrap_or(true)
    {
        errors.push(error(
            ErrorCode::MissingRequiredField,
            format!("{}.input.switch_value", path),
            "input.switch_value is required",
            Some(&node.id),
        ));
    }

    let branches = match node.condition_branches() {
        Ok(branches) => branches,
        Err(message) => {
            errors.push(error(
                ErrorCode::InvalidFormat,
                format!("{}.branches", path),
                message,
                Some(&node.id),
            ));
            return;
        }
    };
    if branches.is_empty() {
        errors.push(error(
            ErrorCode::MissingRequiredField,
            format!("{}.branches", path),
            "at least one branch is required",
            Some(&node.id),
        ));
    }

    for (name, branch) in &branches {
        let branch_path = format!("{}.branches.{}", path, name);
        if name != "default" {
            match &branch.condition {
                Some(op) => {
                    if crate::evaluator::ComparisonOperator::parse(op).is_err() {
                        errors.push(error(
                            ErrorCode::InvalidValue,
                            format!("{}.condition", branch_path),
                            format!("unknown operator: {}", op),
                            Some(&node.id),
                        ));
                    }
                }
                None => errors.push(error(
                    ErrorCode::MissingRequiredField,
                    format!("{}.condition", branch_path),
                    "branch condition is required",
                    Some(&node.id),
                )),
            }
        }
        for (idx, child) in branch.nodes.iter().enumerate() {
            check_node(
                child,
                &format!("{}.nodes[{}]", branch_path, idx),
                seen_ids,
                errors,
                warnings,
            );
        }
    }
}
