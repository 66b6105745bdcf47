//! Tool-calling protocol surface: JSON-RPC 2.0, one message per line.
//!
//! Only stdout carries protocol traffic; logs go to stderr.

pub mod protocol;
pub mod server;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
