//! Read-only tools: listing models and fetching one model's details.

use super::arguments::required_str;
use super::traits::Tool;
use crate::error::ToolError;
use crate::lmstudio::LmStudioClient;
use crate::types::Arguments;
use async_trait::async_trait;
use serde_json::json;

pub struct ListModels;

#[async_trait]
impl Tool for ListModels {
    fn name(&self) -> &str {
        "list_models"
    }

    fn description(&self) -> &str {
        "List all models known to the LM Studio server, including their type, \
         architecture, quantization and whether they are currently loaded."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, client: &LmStudioClient, _args: &Arguments) -> Result<String, ToolError> {
        let models = client.list_models().await?;
        Ok(serde_json::to_string_pretty(&models)?)
    }
}

pub struct GetModelDetails;

#[async_trait]
impl Tool for GetModelDetails {
    fn name(&self) -> &str {
        "get_model_details"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific model, such as its load state \
         and maximum context length."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "model_id": {
                    "type": "string",
                    "description": "Identifier of the model, as returned by list_models"
                }
            },
            "required": ["model_id"]
        })
    }

    async fn execute(&self, client: &LmStudioClient, args: &Arguments) -> Result<String, ToolError> {
        let model_id = required_str(args, "model_id")?;
        let model = client.get_model(model_id).await?;
        Ok(serde_json::to_string_pretty(&model)?)
    }
}
