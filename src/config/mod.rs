pub mod schema;

pub use schema::{ServerConfig, DEFAULT_BASE_URL};

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the inference server URL.
pub const BASE_URL_ENV: &str = "LMSTUDIO_BASE_URL";

/// Default config file location (`<config dir>/lmstudio-mcp/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "lmstudio-mcp")
        .map(|d| d.config_dir().join("config.toml"))
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ServerConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {} (TOML)", path.display()))?;
        Ok(config)
    } else {
        Ok(ServerConfig::default())
    }
}

/// Resolve the effective configuration once at process start.
///
/// Later sources win: defaults, config file, `LMSTUDIO_BASE_URL`, then the
/// `--base-url` flag. An explicitly named config file must exist.
pub fn resolve(
    config_path: Option<&str>,
    env_base_url: Option<String>,
    cli_base_url: Option<String>,
) -> Result<ServerConfig> {
    let mut config = match config_path {
        Some(raw) => {
            let path = PathBuf::from(shellexpand::tilde(raw).into_owned());
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            load_config(&path)?
        }
        None => match default_config_path() {
            Some(path) => load_config(&path)?,
            None => ServerConfig::default(),
        },
    };

    if let Some(url) = env_base_url.filter(|u| !u.trim().is_empty()) {
        config.base_url = url;
    }
    if let Some(url) = cli_base_url {
        config.base_url = url;
    }

    validate_base_url(&config.base_url)?;
    config.base_url = config.normalized_base_url().to_string();
    Ok(config)
}

/// Reject anything that is not an absolute http(s) URL.
pub fn validate_base_url(raw: &str) -> Result<()> {
    let url = reqwest::Url::parse(raw.trim())
        .with_context(|| format!("Invalid inference server URL: {}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("Unsupported URL scheme '{}' in {}", other, raw),
    }
}
