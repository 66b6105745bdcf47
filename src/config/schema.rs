//! Configuration schema for config.toml.

use serde::{Deserialize, Serialize};

/// Default LM Studio REST endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1234";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the inference server.
    pub base_url: String,

    /// Per-request timeout in seconds. Unset means requests may wait forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Name reported to protocol clients.
    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout_secs: None,
            log_level: "info".into(),
            server_name: env!("CARGO_PKG_NAME").into(),
        }
    }
}

impl ServerConfig {
    /// Base URL without trailing slashes.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}
