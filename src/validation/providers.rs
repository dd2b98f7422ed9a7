//! Pass 4: provider availability. Runs only when provider settings are
//! supplied by the host.

use serde_json::Value;

use crate::config::ProviderSettings;
use crate::flow::{FlowSchema, NodeSchema};

use super::types::{error, ErrorCode, ValidationError};

pub fn validate(
    schema: &FlowSchema,
    settings: &ProviderSettings,
    errors: &mut Vec<ValidationError>,
) {
    for (idx, node) in schema.nodes.iter().enumerate() {
        check_node(node, &format!("nodes[{}]", idx), settings, errors);
    }
}

fn check_node(
    node: &NodeSchema,
    path: &str,
    settings: &ProviderSettings,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(category) = node.node_kind().and_then(|k| k.provider_category()) {
        if let Some(Value::String(provider)) = node.config.get("provider") {
            if !settings.has_provider(category, provider) {
                errors.push(error(
                    ErrorCode::MissingProviderConfig,
                    format!("{}.config.provider", path),
                    format!("{} provider '{}' is not configured", category, provider),
                    Some(&node.id),
                ));
            }
        }
    }

    for (idx, child) in node.each_nodes.iter().enumerate() {
        check_node(
            child,
            &format!("{}.each_nodes[{}]", path, idx),
            settings,
            errors,
        );
    }
    if let Ok(branches) = node.condition_branches() {
        for (name, branch) in branches {
            for (idx, child) in branch.nodes.iter().enumerate() {
                check_node(
                    child,
                    &format!("{}.branches.{}.nodes[{}]", path, name, idx),
                    settings,
                    errors,
                );
            }
        }
    }
}
