//! lmstudio-mcp: tool-calling server for LM Studio model management.
//!
//! Usage:
//!   lmstudio-mcp                      Serve tools over stdio (default)
//!   lmstudio-mcp tools                Print the tool catalog as JSON
//!   lmstudio-mcp call <name> [args]   Run one tool call and print the result
//!   lmstudio-mcp models               Show models and their load state

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tracing::{error, info};

use lmstudio_mcp::config::{self, ServerConfig};
use lmstudio_mcp::lmstudio::LmStudioClient;
use lmstudio_mcp::mcp::McpServer;
use lmstudio_mcp::tools::{self, ToolDispatcher};
use lmstudio_mcp::types::{Arguments, ModelDescriptor, ToolInvocation};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "lmstudio-mcp")]
#[command(version)]
#[command(about = "Inspect and control LM Studio models through tool calls")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<String>,

    /// LM Studio base URL (overrides config and LMSTUDIO_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the tools over stdio.
    Serve,

    /// Print the tool catalog as JSON.
    Tools,

    /// Run a single tool call and print its result.
    Call {
        /// Tool name.
        name: String,

        /// Arguments as a JSON object.
        #[arg(default_value = "{}")]
        args: String,
    },

    /// Show the models known to the server.
    Models,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::resolve(
        cli.config.as_deref(),
        std::env::var(config::BASE_URL_ENV).ok(),
        cli.base_url.clone(),
    );

    // Logs go to stderr: stdout belongs to the protocol.
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".into());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return Err(e);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(&config).await,
        Commands::Tools => cmd_tools(),
        Commands::Call { name, args } => cmd_call(&config, name, &args).await,
        Commands::Models => cmd_models(&config).await,
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_serve(config: &ServerConfig) -> Result<()> {
    let dispatcher = ToolDispatcher::new(build_client(config)?);
    let server = Arc::new(McpServer::new(dispatcher, &config.server_name));

    info!(
        "Serving {} tools on stdio (LM Studio at {})",
        server.dispatcher().registry().len(),
        config.base_url
    );

    let result = tokio::select! {
        res = server.serve(tokio::io::stdin(), tokio::io::stdout()) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("Protocol transport failed: {:#}", e);
    }
    info!("Server shutdown complete");
    result
}

fn cmd_tools() -> Result<()> {
    let defs = tools::tool_definitions();
    println!("{}", serde_json::to_string_pretty(&defs)?);
    Ok(())
}

async fn cmd_call(config: &ServerConfig, name: String, raw_args: &str) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(raw_args).context("Arguments must be valid JSON")?;
    let arguments: Arguments = match value {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => Arguments::new(),
        other => bail!("Arguments must be a JSON object, got: {}", other),
    };

    let dispatcher = ToolDispatcher::new(build_client(config)?);
    let result = dispatcher.handle(&ToolInvocation::new(name, arguments)).await;

    if result.is_error {
        eprintln!("{}", result.text().red());
        std::process::exit(1);
    }
    println!("{}", result.text());
    Ok(())
}

async fn cmd_models(config: &ServerConfig) -> Result<()> {
    let client = build_client(config)?;
    let models = client
        .list_models()
        .await
        .with_context(|| format!("Failed to list models from {}", client.base_url()))?;

    if models.is_empty() {
        println!("No models found at {}", client.base_url());
        return Ok(());
    }

    println!();
    println!("{}", format!("=== Models at {} ===", client.base_url()).bold());
    println!();
    for model in &models {
        println!("  {}", describe_model(model));
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_client(config: &ServerConfig) -> Result<LmStudioClient> {
    LmStudioClient::with_timeout(&config.base_url, config.request_timeout())
}

fn describe_model(model: &ModelDescriptor) -> String {
    let state = format!("{:<10}", model.state.to_string());
    let state = if model.is_loaded() {
        state.green()
    } else {
        state.dimmed()
    };
    let mut line = format!("{} {:<10} {}", state, model.kind.to_string(), model.id.bold());
    if let Some(quant) = &model.quantization {
        line.push_str(&format!("  [{}]", quant));
    }
    if let Some(ctx) = model.max_context_length {
        line.push_str(&format!("  ctx {}", ctx));
    }
    line
}
