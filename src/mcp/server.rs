//! Line-delimited JSON-RPC server over a byte stream (stdin/stdout in
//! production, in-memory pipes in tests).
//!
//! Each request line is handled on its own task so slow tool calls do not
//! block the reader. Responses go through a channel to one writer task, so
//! every response is written as one whole line.

use super::protocol::{
    negotiate_version, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::tools::ToolDispatcher;
use crate::types::ToolInvocation;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Tool-calling protocol server wrapping a [`ToolDispatcher`].
pub struct McpServer {
    dispatcher: ToolDispatcher,
    name: String,
    version: String,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher, name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Serve until `reader` reaches EOF, then wait for in-flight calls to
    /// finish writing their responses.
    ///
    /// If the writer fails, no further input is read or dispatched and the
    /// write error is returned.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut lines = BufReader::new(reader).lines();
        loop {
            let line = tokio::select! {
                line = lines.next_line() => line.context("Failed to read from protocol input")?,
                _ = tx.closed() => {
                    warn!("Response writer stopped; no longer reading requests");
                    break;
                }
            };
            let Some(line) = line else {
                info!("Protocol input closed");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if tx.is_closed() {
                warn!("Response writer stopped; dropping request");
                break;
            }

            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    if tx.send(response).is_err() {
                        warn!("Response dropped: writer has stopped");
                    }
                }
            });
        }

        drop(tx);
        writer_task
            .await
            .context("Response writer task panicked")?
    }

    /// Handle one raw line. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Unparseable message: {}", e);
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ));
            }
        };
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version '{}'", request.jsonrpc),
            ));
        }

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);
        debug!("Request {}: {}", id, request.method);

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(&request.params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.dispatcher.definitions() })),
            "tools/call" => self.call_tool(request.params).await,
            other => Err((METHOD_NOT_FOUND, format!("Method not found: {}", other))),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err((code, message)) => JsonRpcResponse::failure(id, code, message),
        })
    }

    fn initialize(&self, params: &Value) -> Value {
        let requested = params["protocolVersion"].as_str();
        if let Some(client) = params["clientInfo"]["name"].as_str() {
            info!("Client connected: {}", client);
        }
        json!({
            "protocolVersion": negotiate_version(requested),
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.name,
                "version": self.version,
            },
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, (i64, String)> {
        let invocation: ToolInvocation = serde_json::from_value(params)
            .map_err(|e| (INVALID_PARAMS, format!("Invalid tools/call params: {}", e)))?;

        let result = self.dispatcher.handle(&invocation).await;
        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, e.to_string()))
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response).context("Failed to encode response")?;
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .context("Failed to write response")?;
        writer.flush().await.context("Failed to flush response")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lmstudio::LmStudioClient;

    fn server() -> McpServer {
        // Nothing listens on port 9; only calls that never reach HTTP are used here.
        let client = LmStudioClient::new("http://127.0.0.1:9").unwrap();
        McpServer::new(ToolDispatcher::new(client), "lmstudio-mcp")
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let resp = server().handle_line("{not json").await.unwrap();
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server().handle_line(line).await.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_reported() {
        let line = r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#;
        let resp = server().handle_line(line).await.unwrap();
        assert_eq!(resp.id, json!(3));
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn initialize_advertises_tools() {
        let line = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"test","version":"0"}}}"#;
        let result = server().handle_line(line).await.unwrap().result.unwrap();
        assert_eq!(result["protocolVersion"], json!("2025-03-26"));
        assert!(result["capabilities"]["tools"].is_object());
        assert_eq!(result["serverInfo"]["name"], json!("lmstudio-mcp"));
    }

    #[tokio::test]
    async fn call_without_name_is_invalid_params() {
        let line = r#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{"arguments":{}}}"#;
        let resp = server().handle_line(line).await.unwrap();
        assert_eq!(resp.id, json!("a"));
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn wrong_jsonrpc_version_is_rejected() {
        let line = r#"{"jsonrpc":"1.0","id":2,"method":"ping"}"#;
        let resp = server().handle_line(line).await.unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_flagged_result_not_a_protocol_error() {
        let line = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"frobnicate","arguments":{}}}"#;
        let resp = server().handle_line(line).await.unwrap();
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Unknown tool"));
        assert!(text.contains("frobnicate"));
    }
}
