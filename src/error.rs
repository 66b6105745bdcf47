//! Error taxonomy for tool invocations.
//!
//! Every variant is turned into an error-flagged `ToolResult` by the
//! dispatcher; none of them escape a `tools/call`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required argument '{0}'")]
    MissingArgument(String),

    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Request to inference server failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status from the inference server.
    #[error("Inference server returned {}{}", status_line(.status), body_suffix(.body))]
    Remote { status: StatusCode, body: String },

    #[error("Malformed response from inference server: {0}")]
    MalformedResponse(String),

    #[error("Failed to render result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ToolError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures detected before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool(_) | Self::MissingArgument(_) | Self::InvalidArgument { .. }
        )
    }
}

fn status_line(status: &StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}
