//! Text-Embedding node. Accepts a single `text`, a `texts` list, or an
//! `items` list of objects carrying a `text` field.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{NodeError, NodeResult};
use crate::executor::ExecutionContext;
use crate::flow::NodeSchema;
use crate::registry::Registry;
use crate::template::{display_string, resolve_value};

use super::executor::NodeExecutor;

#[derive(Debug, Clone, Deserialize)]
pub struct TextEmbeddingConfig {
    pub provider: String,
    pub model: String,
}

pub struct TextEmbeddingExecutor;

#[async_trait]
impl NodeExecutor for TextEmbeddingExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config: TextEmbeddingConfig = serde_json::from_value(node.config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;
        let provider = context
            .providers
            .embedding(&config.provider)
            .ok_or_else(|| NodeError::ProviderNotConfigured(config.provider.clone()))?;

        let (texts, single) = collect_texts(&node.input, registry)?;
        let vectors = provider.embed(&config.model, texts).await?;
        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);

        if single {
            let embedding = vectors.into_iter().next().unwrap_or_default();
            Ok(json!({"embedding": embedding, "dimensions": dimensions}))
        } else {
            let count = vectors.len();
            Ok(json!({
                "embeddings": vectors,
                "count": count,
                "dimensions": dimensions,
            }))
        }
    }
}

/// Gather input texts; the bool marks single-text form.
fn collect_texts(input: &Value, registry: &dyn Registry) -> NodeResult<(Vec<String>, bool)> {
    if let Some(text) = input.get("text").filter(|v| !v.is_null()) {
        let resolved = resolve_value(text, registry);
        return Ok((vec![display_string(&resolved)], true));
    }
    if let Some(texts) = input.get("texts").filter(|v| !v.is_null()) {
        let resolved = resolve_value(texts, registry);
        let items = resolved.as_array().ok_or_else(|| {
            NodeError::TypeError("input.texts must resolve to an array".into())
        })?;
        return Ok((items.iter().map(display_string).collect(), false));
    }
    if let Some(items) = input.get("items").filter(|v| !v.is_null()) {
        let resolved = resolve_value(items, registry);
        let items = resolved.as_array().ok_or_else(|| {
            NodeError::TypeError("input.items must resolve to an array".into())
        })?;
        let texts = items
            .iter()
            .map(|item| match item.get("text") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => display_string(other),
                None => display_string(item),
            })
            .collect();
        return Ok((texts, false));
    }
    Err(NodeError::ConfigError(
        "one of input.text, input.texts, or input.items is required".into(),
    ))
}
