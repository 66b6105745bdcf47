//! Shared types used across the server.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Model descriptors (as reported by the inference server)
// ---------------------------------------------------------------------------

/// Kind of model hosted by the inference server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Text-only language model.
    Llm,
    /// Vision-language model.
    Vlm,
    /// Embedding model.
    Embeddings,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Llm => write!(f, "llm"),
            Self::Vlm => write!(f, "vlm"),
            Self::Embeddings => write!(f, "embeddings"),
        }
    }
}

/// Whether a model currently occupies memory on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadState {
    Loaded,
    NotLoaded,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded => write!(f, "loaded"),
            Self::NotLoaded => write!(f, "not-loaded"),
        }
    }
}

/// Last-known state of one model. Never cached; every query re-fetches.
///
/// The typed fields are read from the object the server sent, and that object
/// is kept whole: serializing a descriptor yields it back key for key,
/// including unmodelled fields and explicit `null`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct ModelDescriptor {
    pub id: String,
    pub kind: ModelKind,
    pub publisher: Option<String>,
    pub arch: Option<String>,
    pub compatibility_type: Option<String>,
    pub quantization: Option<String>,
    pub state: LoadState,
    pub max_context_length: Option<u64>,
    raw: serde_json::Map<String, serde_json::Value>,
}

/// Typed view of the fields the server is required to send.
#[derive(Deserialize)]
struct DescriptorFields {
    id: String,
    #[serde(rename = "type")]
    kind: ModelKind,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    arch: Option<String>,
    #[serde(default)]
    compatibility_type: Option<String>,
    #[serde(default)]
    quantization: Option<String>,
    state: LoadState,
    #[serde(default)]
    max_context_length: Option<u64>,
}

impl ModelDescriptor {
    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// The descriptor exactly as the server reported it.
    pub fn raw(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.raw
    }
}

impl TryFrom<serde_json::Value> for ModelDescriptor {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(raw) = value else {
            return Err(serde::de::Error::custom("model descriptor must be a JSON object"));
        };
        let fields: DescriptorFields = serde_json::from_value(serde_json::Value::Object(raw.clone()))?;
        Ok(Self {
            id: fields.id,
            kind: fields.kind,
            publisher: fields.publisher,
            arch: fields.arch,
            compatibility_type: fields.compatibility_type,
            quantization: fields.quantization,
            state: fields.state,
            max_context_length: fields.max_context_length,
            raw,
        })
    }
}

impl From<ModelDescriptor> for serde_json::Value {
    fn from(model: ModelDescriptor) -> Self {
        serde_json::Value::Object(model.raw)
    }
}

/// Body of `GET /api/v0/models`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelDescriptor>,
}

// ---------------------------------------------------------------------------
// Tool invocation envelope
// ---------------------------------------------------------------------------

/// Argument bag of a tool call.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// A tool call request from the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub arguments: Arguments,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Arguments, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Arguments>::deserialize(deserializer)?.unwrap_or_default())
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// Result of executing a tool. Built for every invocation, success or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// All text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(ContentBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_keeps_unknown_fields() {
        let raw = json!({
            "id": "qwen2-vl-7b-instruct",
            "object": "model",
            "type": "vlm",
            "publisher": "mlx-community",
            "arch": "qwen2_vl",
            "compatibility_type": "mlx",
            "quantization": "4bit",
            "state": "not-loaded",
            "max_context_length": 32768
        });
        let model: ModelDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(model.kind, ModelKind::Vlm);
        assert_eq!(model.state, LoadState::NotLoaded);
        assert_eq!(model.max_context_length, Some(32768));
        assert_eq!(model.raw().get("object"), Some(&json!("model")));
        assert_eq!(serde_json::to_value(&model).unwrap(), raw);
    }

    #[test]
    fn minimal_descriptor_does_not_grow_fields() {
        let raw = json!({"id": "x", "type": "llm", "state": "loaded"});
        let model: ModelDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert!(model.is_loaded());
        assert_eq!(serde_json::to_value(&model).unwrap(), raw);
    }

    #[test]
    fn explicit_nulls_survive_a_round_trip() {
        let raw = json!({
            "id": "x",
            "type": "llm",
            "state": "loaded",
            "publisher": null,
            "max_context_length": null
        });
        let model: ModelDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(model.publisher, None);
        assert_eq!(model.max_context_length, None);
        assert_eq!(serde_json::to_value(&model).unwrap(), raw);
    }

    #[test]
    fn non_object_descriptor_is_rejected() {
        assert!(serde_json::from_value::<ModelDescriptor>(json!(["x", "llm", "loaded"])).is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let raw = json!({"id": "x", "type": "tts", "state": "loaded"});
        assert!(serde_json::from_value::<ModelDescriptor>(raw).is_err());
    }

    #[test]
    fn tool_result_uses_protocol_field_names() {
        let value = serde_json::to_value(ToolResult::error("boom")).unwrap();
        assert_eq!(
            value,
            json!({"content": [{"type": "text", "text": "boom"}], "isError": true})
        );
    }

    #[test]
    fn invocation_accepts_null_arguments() {
        let call: ToolInvocation =
            serde_json::from_value(json!({"name": "list_models", "arguments": null})).unwrap();
        assert!(call.arguments.is_empty());

        let call: ToolInvocation = serde_json::from_value(json!({"name": "list_models"})).unwrap();
        assert!(call.arguments.is_empty());
    }
}
