//! External collaborator contracts: language models, embeddings, vector
//! stores, and PDF rasterization.
//!
//! The runtime only sees these traits; concrete HTTP clients live outside
//! the crate and are registered on a [`ProviderRegistry`] at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised by provider adapters. Timeouts are the adapter's
/// responsibility; they surface here and participate in the node error
/// protocol.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A single message sent to a language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: String,
    #[serde(default)]
    pub text: Option<String>,
    /// Data URL of an attached image, if any.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Request payload for a model generation call.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

/// Reply from a model generation call.
#[derive(Debug, Clone)]
pub struct LlmReply {
    pub text: String,
    pub usage: Option<Value>,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmReply, ProviderError>;
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, model: &str, texts: Vec<String>) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// One record written to or read from a vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VectorQuery {
    pub index_name: String,
    pub namespace: Option<String>,
    /// Text query; the adapter embeds it when no raw vector is given.
    pub query: Option<String>,
    pub vector: Option<Vec<f32>>,
    pub top_k: Option<usize>,
    pub similarity_threshold: Option<f64>,
    pub filter: Option<Value>,
}

/// A scored search match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct VectorDeletion {
    pub index_name: String,
    pub namespace: Option<String>,
    pub ids: Vec<String>,
    pub filter: Option<Value>,
    pub delete_all: bool,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn insert(
        &self,
        index_name: &str,
        namespace: Option<&str>,
        records: Vec<VectorRecord>,
    ) -> Result<usize, ProviderError>;

    async fn search(&self, query: VectorQuery) -> Result<Vec<VectorMatch>, ProviderError>;

    async fn update(
        &self,
        index_name: &str,
        namespace: Option<&str>,
        record: VectorRecord,
    ) -> Result<(), ProviderError>;

    async fn delete(&self, deletion: VectorDeletion) -> Result<usize, ProviderError>;
}

/// Page rasterization options for the document splitter.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub dpi: u32,
    pub format: String,
    pub quality: String,
}

/// One rasterized page.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    async fn rasterize(
        &self,
        path: &Path,
        options: &RasterOptions,
    ) -> Result<Vec<PageImage>, ProviderError>;
}

/// Runtime registry of provider adapters, one map per category.
#[derive(Default)]
pub struct ProviderRegistry {
    llm: HashMap<String, Arc<dyn LanguageModel>>,
    embedding: HashMap<String, Arc<dyn EmbeddingModel>>,
    vector: HashMap<String, Arc<dyn VectorIndex>>,
    rasterizer: Option<Arc<dyn PdfRasterizer>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_llm(&mut self, name: &str, provider: Arc<dyn LanguageModel>) {
        self.llm.insert(name.to_string(), provider);
    }

    pub fn register_embedding(&mut self, name: &str, provider: Arc<dyn EmbeddingModel>) {
        self.embedding.insert(name.to_string(), provider);
    }

    pub fn register_vector(&mut self, name: &str, provider: Arc<dyn VectorIndex>) {
        self.vector.insert(name.to_string(), provider);
    }

    pub fn set_rasterizer(&mut self, rasterizer: Arc<dyn PdfRasterizer>) {
        self.rasterizer = Some(rasterizer);
    }

    pub fn llm(&self, name: &str) -> Option<Arc<dyn LanguageModel>> {
        self.llm.get(name).cloned()
    }

    pub fn embedding(&self, name: &str) -> Option<Arc<dyn EmbeddingModel>> {
        self.embedding.get(name).cloned()
    }

    pub fn vector(&self, name: &str) -> Option<Arc<dyn VectorIndex>> {
        self.vector.get(name).cloned()
    }

    pub fn rasterizer(&self) -> Option<Arc<dyn PdfRasterizer>> {
        self.rasterizer.clone()
    }
}
