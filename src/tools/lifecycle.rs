//! Tools that change what the server keeps in memory. Each one sends a
//! single one-token completion; see [`crate::lmstudio::probe`].

use super::arguments::{optional_seconds, optional_str, required_str};
use super::traits::Tool;
use crate::error::ToolError;
use crate::lmstudio::{LmStudioClient, ProbeRequest, DEFAULT_LOAD_TTL_SECS};
use crate::types::Arguments;
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

pub struct LoadModel;

#[async_trait]
impl Tool for LoadModel {
    fn name(&self) -> &str {
        "load_model"
    }

    fn description(&self) -> &str {
        "Load a model into memory. The model stays loaded for `ttl` seconds \
         after its last use before the server unloads it automatically."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "model_id": {
                    "type": "string",
                    "description": "Identifier of the model to load"
                },
                "ttl": {
                    "type": "number",
                    "description": "Seconds to keep the model loaded after last use",
                    "default": DEFAULT_LOAD_TTL_SECS
                }
            },
            "required": ["model_id"]
        })
    }

    async fn execute(&self, client: &LmStudioClient, args: &Arguments) -> Result<String, ToolError> {
        let model_id = required_str(args, "model_id")?;
        let ttl = optional_seconds(args, "ttl")?.unwrap_or(DEFAULT_LOAD_TTL_SECS);

        client
            .send_probe(&ProbeRequest::new(model_id, "ping").ttl(ttl))
            .await?;

        info!("Requested load of '{}' (ttl {}s)", model_id, ttl);
        Ok(format!(
            "Model '{}' load requested (ttl: {} seconds)",
            model_id, ttl
        ))
    }
}

pub struct UnloadModel;

#[async_trait]
impl Tool for UnloadModel {
    fn name(&self) -> &str {
        "unload_model"
    }

    fn description(&self) -> &str {
        "Unload a model from memory immediately."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "model_id": {
                    "type": "string",
                    "description": "Identifier of the model to unload"
                }
            },
            "required": ["model_id"]
        })
    }

    async fn execute(&self, client: &LmStudioClient, args: &Arguments) -> Result<String, ToolError> {
        let model_id = required_str(args, "model_id")?;

        client
            .send_probe(&ProbeRequest::new(model_id, "unload").ttl(0))
            .await?;

        info!("Requested unload of '{}'", model_id);
        Ok(format!("Model '{}' unload requested", model_id))
    }
}

pub struct ConfigureModel;

#[async_trait]
impl Tool for ConfigureModel {
    fn name(&self) -> &str {
        "configure_model"
    }

    fn description(&self) -> &str {
        "Change a model's settings. Only the settings you pass are changed; \
         omitted ones keep their current value on the server."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "model_id": {
                    "type": "string",
                    "description": "Identifier of the model to configure"
                },
                "ttl": {
                    "type": "number",
                    "description": "Seconds to keep the model loaded after last use (0 unloads it)"
                },
                "draft_model": {
                    "type": "string",
                    "description": "Draft model to use for speculative decoding"
                }
            },
            "required": ["model_id"]
        })
    }

    async fn execute(&self, client: &LmStudioClient, args: &Arguments) -> Result<String, ToolError> {
        let model_id = required_str(args, "model_id")?;
        let request = ProbeRequest::new(model_id, "ping")
            .maybe_ttl(optional_seconds(args, "ttl")?)
            .maybe_draft_model(optional_str(args, "draft_model")?);

        client.send_probe(&request).await?;

        let changed = request.changed_settings();
        info!("Configured '{}': {:?}", model_id, changed);
        if changed.is_empty() {
            Ok(format!("Model '{}' configured (no settings changed)", model_id))
        } else {
            Ok(format!(
                "Model '{}' configured: {}",
                model_id,
                changed.join(", ")
            ))
        }
    }
}
