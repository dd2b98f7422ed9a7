//! Vector-store nodes: insert, search, update, delete. All four share one
//! config shape and dispatch to the configured [`VectorIndex`] adapter.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{NodeError, NodeResult};
use crate::executor::ExecutionContext;
use crate::flow::NodeSchema;
use crate::providers::{VectorDeletion, VectorQuery, VectorRecord};
use crate::registry::Registry;
use crate::template::{display_string, resolve_value};

use super::executor::NodeExecutor;

#[derive(Debug, Clone, Deserialize)]
pub struct VectorNodeConfig {
    pub provider: String,
    pub index_name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub filter: Option<Value>,
}

fn parse_config(node: &NodeSchema) -> NodeResult<VectorNodeConfig> {
    serde_json::from_value(node.config.clone()).map_err(|e| NodeError::ConfigError(e.to_string()))
}

fn adapter(
    config: &VectorNodeConfig,
    context: &ExecutionContext,
) -> NodeResult<std::sync::Arc<dyn crate::providers::VectorIndex>> {
    context
        .providers
        .vector(&config.provider)
        .ok_or_else(|| NodeError::ProviderNotConfigured(config.provider.clone()))
}

fn records_from(value: Value) -> NodeResult<Vec<VectorRecord>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(NodeError::TypeError(format!(
                "records must be an array, got {}",
                crate::registry::value_type_name(&other)
            )))
        }
    };
    items
        .into_iter()
        .map(|item| {
            let mut record: VectorRecord = serde_json::from_value(normalize_record(item))
                .map_err(|e| NodeError::InputValidationError(format!("record: {}", e)))?;
            if record.id.is_empty() {
                record.id = uuid::Uuid::new_v4().to_string();
            }
            Ok(record)
        })
        .collect()
}

/// Records without an id get one assigned during deserialization.
fn normalize_record(mut item: Value) -> Value {
    if let Value::Object(map) = &mut item {
        map.entry("id".to_string())
            .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
    }
    item
}

pub struct VectorInsertExecutor;

#[async_trait]
impl NodeExecutor for VectorInsertExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config = parse_config(node)?;
        let adapter = adapter(&config, context)?;

        let raw = node
            .input
            .get("records")
            .or_else(|| node.input.get("vectors"))
            .cloned()
            .ok_or_else(|| {
                NodeError::ConfigError("input.records or input.vectors is required".into())
            })?;
        let records = records_from(resolve_value(&raw, registry))?;

        let inserted = adapter
            .insert(&config.index_name, config.namespace.as_deref(), records)
            .await?;
        Ok(json!({"inserted_count": inserted, "index_name": config.index_name}))
    }
}

pub struct VectorSearchExecutor;

#[async_trait]
impl NodeExecutor for VectorSearchExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config = parse_config(node)?;
        let adapter = adapter(&config, context)?;

        let query_text = node
            .input
            .get("query")
            .filter(|v| !v.is_null())
            .map(|v| display_string(&resolve_value(v, registry)));
        let query_vector = match node.input.get("vector").filter(|v| !v.is_null()) {
            Some(raw) => Some(
                serde_json::from_value::<Vec<f32>>(resolve_value(raw, registry))
                    .map_err(|e| NodeError::InputValidationError(format!("vector: {}", e)))?,
            ),
            None => None,
        };
        if query_text.is_none() && query_vector.is_none() {
            return Err(NodeError::ConfigError(
                "input.query or input.vector is required".into(),
            ));
        }

        let filter = config
            .filter
            .as_ref()
            .map(|f| resolve_value(f, registry));

        let matches = adapter
            .search(VectorQuery {
                index_name: config.index_name.clone(),
                namespace: config.namespace.clone(),
                query: query_text,
                vector: query_vector,
                top_k: config.top_k,
                similarity_threshold: config.similarity_threshold,
                filter,
            })
            .await?;

        let count = matches.len();
        Ok(json!({"matches": matches, "count": count}))
    }
}

pub struct VectorUpdateExecutor;

#[async_trait]
impl NodeExecutor for VectorUpdateExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config = parse_config(node)?;
        let adapter = adapter(&config, context)?;

        let resolved = resolve_value(&node.input, registry);
        let id = resolved
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| NodeError::ConfigError("input.id is required".into()))?
            .to_string();
        let vector = match resolved.get("vector").filter(|v| !v.is_null()) {
            Some(raw) => Some(
                serde_json::from_value::<Vec<f32>>(raw.clone())
                    .map_err(|e| NodeError::InputValidationError(format!("vector: {}", e)))?,
            ),
            None => None,
        };
        let metadata = resolved.get("metadata").filter(|v| !v.is_null()).cloned();

        adapter
            .update(
                &config.index_name,
                config.namespace.as_deref(),
                VectorRecord {
                    id: id.clone(),
                    vector,
                    metadata,
                    text: None,
                },
            )
            .await?;
        Ok(json!({"updated": true, "id": id}))
    }
}

pub struct VectorDeleteExecutor;

#[async_trait]
impl NodeExecutor for VectorDeleteExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config = parse_config(node)?;
        let adapter = adapter(&config, context)?;

        let resolved = resolve_value(&node.input, registry);
        let ids: Vec<String> = match resolved.get("ids").filter(|v| !v.is_null()) {
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|e| NodeError::InputValidationError(format!("ids: {}", e)))?,
            None => Vec::new(),
        };
        let filter = resolved.get("filter").filter(|v| !v.is_null()).cloned();
        let delete_all = resolved
            .get("delete_all")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if ids.is_empty() && filter.is_none() && !delete_all {
            return Err(NodeError::ConfigError(
                "input.ids, input.filter, or input.delete_all is required".into(),
            ));
        }

        let deleted = adapter
            .delete(VectorDeletion {
                index_name: config.index_name.clone(),
                namespace: config.namespace.clone(),
                ids,
                filter,
                delete_all,
            })
            .await?;
        Ok(json!({"deleted_count": deleted}))
    }
}
