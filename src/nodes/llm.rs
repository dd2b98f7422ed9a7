//! LLM node: prompt templating, vision attachments, and structured-output
//! enforcement against the node's declared output schema.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{NodeError, NodeResult};
use crate::executor::ExecutionContext;
use crate::flow::NodeSchema;
use crate::providers::{LlmMessage, LlmRequest};
use crate::registry::Registry;
use crate::template::{display_string, resolve_value};

use super::executor::NodeExecutor;

#[derive(Debug, Clone, Deserialize)]
pub struct LlmNodeConfig {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub mcp_servers: Option<Value>,
    #[serde(default)]
    pub tools: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageSchema {
    #[serde(default = "default_role")]
    role: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

/// Declared shape of one output field.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputFieldSpec {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Option<Value>,
    #[serde(default)]
    pub structure: Option<Value>,
}

pub struct LlmNodeExecutor;

#[async_trait]
impl NodeExecutor for LlmNodeExecutor {
    async fn execute(
        &self,
        node: &NodeSchema,
        registry: &mut dyn Registry,
        context: &ExecutionContext,
    ) -> NodeResult<Value> {
        let config: LlmNodeConfig = serde_json::from_value(node.config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;
        let message_schemas: Vec<MessageSchema> = serde_json::from_value(node.messages.clone())
            .map_err(|e| NodeError::ConfigError(format!("messages: {}", e)))?;
        let output_schema: Map<String, Value> = match &node.output {
            Value::Object(map) => map.clone(),
            _ => return Err(NodeError::ConfigError("an output schema is required".into())),
        };

        let provider = context
            .providers
            .llm(&config.provider)
            .ok_or_else(|| NodeError::ProviderNotConfigured(config.provider.clone()))?;

        let mut messages = Vec::with_capacity(message_schemas.len() + 1);
        for msg in &message_schemas {
            let text = msg
                .text
                .as_ref()
                .map(|t| display_string(&resolve_value(&Value::String(t.clone()), registry)));
            let image_url = match &msg.image {
                Some(reference) => Some(resolve_image(reference, registry, context)?),
                None => None,
            };
            messages.push(LlmMessage {
                role: msg.role.clone(),
                text,
                image_url,
            });
        }
        messages.push(LlmMessage {
            role: "system".to_string(),
            text: Some(schema_instruction(&output_schema)?),
            image_url: None,
        });

        let reply = provider
            .generate(LlmRequest {
                model: config.model.clone(),
                messages,
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            })
            .await?;

        let parsed = parse_reply_json(&reply.text)?;
        validate_against_schema(&parsed, &output_schema)?;

        // keep only the declared fields
        let parsed_fields = parsed.as_object().cloned().unwrap_or_default();
        let mut output = Map::new();
        for field in output_schema.keys() {
            output.insert(
                field.clone(),
                parsed_fields.get(field).cloned().unwrap_or(Value::Null),
            );
        }
        Ok(Value::Object(output))
    }
}

/// Resolve a message image reference to a data URL: a known file handle, a
/// filesystem path, or an already-encoded data URL.
fn resolve_image(
    reference: &str,
    registry: &dyn Registry,
    context: &ExecutionContext,
) -> NodeResult<String> {
    let resolved = resolve_value(&Value::String(reference.to_string()), registry);
    let resolved = display_string(&resolved);
    if resolved.starts_with("data:") {
        return Ok(resolved);
    }
    let file_id = if context.files.has_file(&resolved) {
        resolved
    } else {
        context.files.register_file(&resolved)?.id
    };
    context.files.get_file_data_url(&file_id)
}

/// Strict format instruction appended as the final system message.
fn schema_instruction(schema: &Map<String, Value>) -> NodeResult<String> {
    let mut lines = vec![
        "Respond with only a valid JSON object, no surrounding text.".to_string(),
        "The object must contain exactly these fields:".to_string(),
    ];
    for (field, raw) in schema {
        let spec: OutputFieldSpec = serde_json::from_value(raw.clone())
            .map_err(|e| NodeError::ConfigError(format!("output.{}: {}", field, e)))?;
        let description = spec
            .description
            .map(|d| format!(" - {}", d))
            .unwrap_or_default();
        lines.push(format!("- \"{}\" ({}){}", field, spec.field_type, description));
    }
    Ok(lines.join("\n"))
}

/// Parse the provider reply as JSON, tolerating a fenced code block.
fn parse_reply_json(text: &str) -> NodeResult<Value> {
    let trimmed = text.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        rest.trim_start().strip_suffix("```").unwrap_or(rest).trim()
    } else {
        trimmed
    };
    serde_json::from_str(body)
        .map_err(|e| NodeError::SchemaViolation(format!("reply is not valid JSON: {}", e)))
}

fn validate_against_schema(parsed: &Value, schema: &Map<String, Value>) -> NodeResult<()> {
    let Value::Object(obj) = parsed else {
        return Err(NodeError::SchemaViolation(
            "reply is not a JSON object".into(),
        ));
    };
    for (field, raw) in schema {
        let Some(value) = obj.get(field) else {
            return Err(NodeError::SchemaViolation(format!(
                "missing declared field '{}'",
                field
            )));
        };
        let spec: OutputFieldSpec = serde_json::from_value(raw.clone())
            .map_err(|e| NodeError::ConfigError(format!("output.{}: {}", field, e)))?;
        let ok = match spec.field_type.as_str() {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !ok {
            return Err(NodeError::SchemaViolation(format!(
                "field '{}' should be {}, got {}",
                field,
                spec.field_type,
                crate::registry::value_type_name(value)
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_reply_plain_and_fenced() {
        assert_eq!(
            parse_reply_json(r#"{"answer": "yes"}"#).unwrap(),
            json!({"answer": "yes"})
        );
        assert_eq!(
            parse_reply_json("```json\n{\"answer\": \"yes\"}\n```").unwrap(),
            json!({"answer": "yes"})
        );
        assert!(parse_reply_json("the answer is yes").is_err());
    }

    #[test]
    fn test_schema_validation() {
        let schema: Map<String, Value> = serde_json::from_value(json!({
            "answer": {"type": "string", "description": "the answer"},
            "confidence": {"type": "number"}
        }))
        .unwrap();

        assert!(validate_against_schema(
            &json!({"answer": "yes", "confidence": 0.9}),
            &schema
        )
        .is_ok());

        let missing = validate_against_schema(&json!({"answer": "yes"}), &schema).unwrap_err();
        assert!(missing.to_string().contains("confidence"));

        let wrong_type =
            validate_against_schema(&json!({"answer": 1, "confidence": 0.9}), &schema).unwrap_err();
        assert!(matches!(wrong_type, NodeError::SchemaViolation(_)));
    }

    #[test]
    fn test_schema_instruction_lists_fields() {
        let schema: Map<String, Value> = serde_json::from_value(json!({
            "summary": {"type": "string", "description": "one-line summary"}
        }))
        .unwrap();
        let instruction = schema_instruction(&schema).unwrap();
        assert!(instruction.contains("\"summary\" (string)"));
        assert!(instruction.contains("one-line summary"));
        assert!(instruction.contains("only a valid JSON object"));
    }
}
