pub mod client;
pub mod probe;

pub use client::LmStudioClient;
pub use probe::{ProbeRequest, DEFAULT_LOAD_TTL_SECS};
