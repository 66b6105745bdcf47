//! One-token chat completion used to steer model loading.
//!
//! LM Studio loads a model on demand when a completion names it, and keeps
//! it resident for `ttl` seconds afterwards (`0` unloads immediately). The
//! load, unload and configure tools all speak through this request.

use serde::Serialize;

/// Time-to-live applied by `load_model` when the caller gives none.
pub const DEFAULT_LOAD_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeMessage {
    pub role: &'static str,
    pub content: String,
}

/// Body of `POST /api/v0/chat/completions`.
///
/// Optional settings are serialized only when set, so an omitted field
/// leaves the server's current value untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeRequest {
    pub model: String,
    pub messages: Vec<ProbeMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_model: Option<String>,
}

impl ProbeRequest {
    pub fn new(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ProbeMessage {
                role: "system",
                content: content.into(),
            }],
            max_tokens: 1,
            ttl: None,
            draft_model: None,
        }
    }

    pub fn ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn maybe_ttl(mut self, ttl: Option<u64>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn maybe_draft_model(mut self, draft_model: Option<String>) -> Self {
        self.draft_model = draft_model;
        self
    }

    /// Names of the optional settings this request changes.
    pub fn changed_settings(&self) -> Vec<String> {
        let mut changed = Vec::new();
        if let Some(ttl) = self.ttl {
            changed.push(format!("ttl={}s", ttl));
        }
        if let Some(draft) = &self.draft_model {
            changed.push(format!("draft_model={}", draft));
        }
        changed
    }
}
