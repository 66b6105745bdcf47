//! LM Studio REST API client (`/api/v0`) for model listing and load control.

use crate::error::ToolError;
use crate::lmstudio::probe::ProbeRequest;
use crate::types::{ModelDescriptor, ModelList};
use anyhow::Context;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// LM Studio API client. The base URL is fixed at construction.
#[derive(Debug, Clone)]
pub struct LmStudioClient {
    base_url: Url,
    http: reqwest::Client,
}

impl LmStudioClient {
    /// Create a client with no request timeout.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client, optionally bounding every request by `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim().trim_end_matches('/'))
            .with_context(|| format!("Invalid inference server URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Inference server URL cannot be used as a base: {}", base_url);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Build an API URL from path segments. Each segment is percent-escaped,
    /// so a model id containing `/` stays a single segment.
    fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v0"]).extend(segments);
        }
        url
    }

    /// List every model the server knows about.
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ToolError> {
        let url = self.api_url(&["models"]);
        debug!("LM Studio GET {}", url);

        let resp = self.http.get(url).send().await?;
        let list: ModelList = decode(check_status(resp).await?).await?;
        debug!("Server reported {} models", list.data.len());
        Ok(list.data)
    }

    /// Fetch a single model's descriptor.
    pub async fn get_model(&self, model_id: &str) -> Result<ModelDescriptor, ToolError> {
        let url = self.api_url(&["models", model_id]);
        debug!("LM Studio GET {}", url);

        let resp = self.http.get(url).send().await?;
        decode(check_status(resp).await?).await
    }

    /// Send a one-token completion. The response body is drained but not
    /// interpreted; only the status matters.
    pub async fn send_probe(&self, request: &ProbeRequest) -> Result<(), ToolError> {
        let url = self.api_url(&["chat", "completions"]);
        debug!(
            "LM Studio POST {} (model: {}, ttl: {:?}, draft_model: {:?})",
            url, request.model, request.ttl, request.draft_model
        );

        let resp = self.http.post(url).json(request).send().await?;
        let resp = check_status(resp).await?;
        let _ = resp.bytes().await?;
        Ok(())
    }
}

async fn check_status(resp: Response) -> Result<Response, ToolError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ToolError::Remote { status, body })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ToolError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ToolError::MalformedResponse(e.to_string()))
}
