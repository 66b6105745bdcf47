//! In-process stand-in for the LM Studio REST API.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use lmstudio_mcp::lmstudio::LmStudioClient;
use lmstudio_mcp::tools::ToolDispatcher;

/// A request the fake server received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// How the fake server answers.
#[derive(Debug, Clone)]
pub enum Behaviour {
    Normal,
    Status(u16),
    Garbage,
}

#[derive(Clone)]
struct FakeState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    models: Arc<Value>,
    behaviour: Behaviour,
}

pub struct FakeLmStudio {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeLmStudio {
    pub async fn start() -> Self {
        Self::start_with(default_models(), Behaviour::Normal).await
    }

    pub async fn failing(status: u16) -> Self {
        Self::start_with(default_models(), Behaviour::Status(status)).await
    }

    pub async fn start_with(models: Value, behaviour: Behaviour) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            requests: Arc::clone(&requests),
            models: Arc::new(models),
            behaviour,
        };
        let app = Router::new()
            .route("/api/v0/models", get(list_models))
            .route("/api/v0/models/{id}", get(get_model))
            .route("/api/v0/chat/completions", post(chat_completion))
            .fallback(unrouted)
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake server");
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn dispatcher(&self) -> ToolDispatcher {
        ToolDispatcher::new(LmStudioClient::new(&self.base_url).expect("client"))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("lock").clone()
    }

    /// Body of the single request received so far.
    pub fn only_body(&self) -> Value {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {:?}", requests);
        requests[0].body.clone().expect("request had a JSON body")
    }
}

pub fn default_models() -> Value {
    json!([
        {
            "id": "qwen2.5-7b-instruct",
            "object": "model",
            "type": "llm",
            "publisher": "lmstudio-community",
            "arch": "qwen2",
            "compatibility_type": "gguf",
            "quantization": "Q4_K_M",
            "state": "loaded",
            "max_context_length": 32768
        },
        {
            "id": "text-embedding-nomic-embed-text-v1.5",
            "object": "model",
            "type": "embeddings",
            "publisher": "nomic-ai",
            "arch": "nomic-bert",
            "compatibility_type": "gguf",
            "quantization": "Q4_0",
            "state": "not-loaded",
            "max_context_length": 2048
        }
    ])
}

impl FakeState {
    /// Record the request, then return the canned answer if the server is
    /// configured to misbehave.
    fn record(&self, method: Method, uri: &Uri, body: &[u8]) -> Option<Response> {
        self.requests.lock().expect("lock").push(Recorded {
            method,
            path: uri.path().to_string(),
            body: serde_json::from_slice(body).ok(),
        });

        match &self.behaviour {
            Behaviour::Status(code) => {
                let status = StatusCode::from_u16(*code).expect("status code");
                Some((status, Json(json!({"error": "rejected by fake server"}))).into_response())
            }
            Behaviour::Garbage => Some((StatusCode::OK, "<html>not json</html>").into_response()),
            Behaviour::Normal => None,
        }
    }
}

async fn list_models(State(state): State<FakeState>, method: Method, uri: Uri) -> Response {
    if let Some(resp) = state.record(method, &uri, &[]) {
        return resp;
    }
    Json(json!({"object": "list", "data": state.models.as_ref()})).into_response()
}

async fn get_model(
    State(state): State<FakeState>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
) -> Response {
    if let Some(resp) = state.record(method, &uri, &[]) {
        return resp;
    }
    let found = state
        .models
        .as_array()
        .and_then(|models| models.iter().find(|m| m["id"] == json!(id)));
    match found {
        Some(model) => Json(model.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Model {} not found", id)})),
        )
            .into_response(),
    }
}

async fn chat_completion(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    if let Some(resp) = state.record(method, &uri, &body) {
        return resp;
    }
    Json(json!({
        "id": "chatcmpl-fake",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "."}}]
    }))
    .into_response()
}

async fn unrouted(State(state): State<FakeState>, method: Method, uri: Uri, body: Bytes) -> Response {
    state
        .record(method, &uri, &body)
        .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
}
