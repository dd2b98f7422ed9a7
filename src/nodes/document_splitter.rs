//! Document-Splitter node: rasterizes a PDF into per-page images registered
//! with the file store.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{NodeError, NodeResult};
use crate::executor::ExecutionContext;
use crate::flow::NodeSchema;
use crate::providers::RasterOptions;
use crate::registry::Registry;
use crate::template::{display_string, resolve_value};

use super::executor::NodeExecutor;

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSplitterConfig {
    #[serde(default = "default_quality")]
    pub image_quality: String,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default = "default_format")]
    pub image_format: String,
}

fn default_quality() -> String {
    "medium".to_string()
}

fn default_dpi() -> u32 {
    150
}

fn default_format() -> String {
    "png".to_string()
}

pub struct DocumentSplitterExecutor;

#[async_trait]
impl NodeExecutor for DocumentSplitterExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config: DocumentSplitterConfig = serde_json::from_value(node.config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;
        let rasterizer = context
            .providers
            .rasterizer()
            .ok_or_else(|| NodeError::ProviderNotConfigured("pdf-rasterizer".into()))?;

        let reference = display_string(&resolve_value(&node.document, registry));
        if reference.is_empty() {
            return Err(NodeError::ConfigError("document is required".into()));
        }
        let entry = match context.files.get_file(&reference) {
            Some(entry) => entry,
            None => context.files.register_file(&reference)?,
        };

        let pages = rasterizer
            .rasterize(
                &entry.temp_path,
                &RasterOptions {
                    dpi: config.dpi,
                    format: config.image_format.clone(),
                    quality: config.image_quality.clone(),
                },
            )
            .await?;

        let mut page_entries = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let image = context.files.register_file(&page.path)?;
            page_entries.push(json!({
                "index": index,
                "file_id": image.id,
                "path": page.path,
                "width": page.width,
                "height": page.height,
            }));
        }

        Ok(json!({
            "document": entry.id,
            "total_pages": page_entries.len(),
            "pages": page_entries,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: DocumentSplitterConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.image_quality, "medium");
        assert_eq!(config.dpi, 150);
        assert_eq!(config.image_format, "png");
    }

    #[test]
    fn test_config_explicit() {
        let config: DocumentSplitterConfig = serde_json::from_value(json!({
            "image_quality": "high", "dpi": 300, "image_format": "webp"
        }))
        .unwrap();
        assert_eq!(config.image_quality, "high");
        assert_eq!(config.dpi, 300);
        assert_eq!(config.image_format, "webp");
    }
}
