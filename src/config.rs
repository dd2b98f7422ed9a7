//! Host configuration for the flow executor.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FlowError, FlowResult};

/// Top-level host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub concurrency: ConcurrencySettings,
    #[serde(default)]
    pub providers: ProviderSettings,
    /// Default provider timeout in seconds, passed through to adapters.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(rename = "logLevel", default)]
    pub log_level: LogLevel,
    #[serde(rename = "tempDir", default)]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencySettings {
    pub global_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Declared provider credentials, by category then provider name. Used by
/// the validator's availability pass; actual adapters are registered
/// separately on the [`ProviderRegistry`](crate::providers::ProviderRegistry).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub llm: HashMap<String, ProviderCredentials>,
    #[serde(default)]
    pub embedding: HashMap<String, ProviderCredentials>,
    #[serde(default)]
    pub vector: HashMap<String, ProviderCredentials>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl ProviderSettings {
    pub fn is_empty(&self) -> bool {
        self.llm.is_empty() && self.embedding.is_empty() && self.vector.is_empty()
    }

    /// Whether a provider name is configured under the given category.
    pub fn has_provider(&self, category: &str, name: &str) -> bool {
        match category {
            "llm" => self.llm.contains_key(name),
            "embedding" => self.embedding.contains_key(name),
            "vector" => self.vector.contains_key(name),
            _ => false,
        }
    }
}

impl HostConfig {
    pub fn with_global_limit(global_limit: usize) -> Self {
        HostConfig {
            concurrency: ConcurrencySettings { global_limit },
            providers: ProviderSettings::default(),
            timeout: None,
            log_level: LogLevel::default(),
            temp_dir: None,
        }
    }

    pub fn validate(&self) -> FlowResult<()> {
        if self.concurrency.global_limit == 0 {
            return Err(FlowError::InvalidConfig(
                "concurrency.global_limit must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserializes() {
        let json = serde_json::json!({
            "concurrency": {"global_limit": 4},
            "providers": {
                "llm": {"openai": {"apiKey": "sk-test", "baseUrl": "http://localhost"}},
                "vector": {"pinecone": {"apiKey": "pc-test"}}
            },
            "logLevel": "warn",
            "tempDir": "/tmp/flows"
        });
        let config: HostConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.concurrency.global_limit, 4);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.providers.has_provider("llm", "openai"));
        assert!(config.providers.has_provider("vector", "pinecone"));
        assert!(!config.providers.has_provider("embedding", "openai"));
        let creds = &config.providers.llm["openai"];
        assert_eq!(creds.api_key.as_deref(), Some("sk-test"));
        assert!(creds.extra.contains_key("baseUrl"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = HostConfig::with_global_limit(0);
        assert!(config.validate().is_err());
        assert!(HostConfig::with_global_limit(1).validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: HostConfig =
            serde_json::from_value(serde_json::json!({"concurrency": {"global_limit": 1}}))
                .unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.providers.is_empty());
        assert!(config.temp_dir.is_none());
    }
}
