//! lmstudio-mcp: model lifecycle tools for a local LM Studio server.
//!
//! Exposes five tools (list, inspect, load, unload, configure) over a
//! line-delimited JSON-RPC protocol on stdio. Every tool call becomes exactly
//! one request against LM Studio's `/api/v0` REST API.

pub mod config;
pub mod error;
pub mod lmstudio;
pub mod mcp;
pub mod tools;
pub mod types;
