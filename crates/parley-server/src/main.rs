//! parley-server binary
//!
//! Loads `parley.yaml` (or defaults), wires the chat service and serves the
//! HTTP API until Ctrl+C or SIGTERM.

use anyhow::Context;
use clap::Parser;
use parley_core::{ChatService, ConfigLoader};
use parley_server::{shutdown_signal, ParleyServer, ServerConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Command line arguments for the Parley server.
#[derive(Parser, Debug)]
#[command(name = "parley-server")]
#[command(about = "Chat, URL summarization and web search over HTTP")]
#[command(version)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "parley.yaml")]
    config: PathBuf,

    /// Server bind address, overrides the configuration file
    #[arg(short, long)]
    bind: Option<String>,

    /// Disable request logging
    #[arg(long)]
    no_request_log: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let config = ConfigLoader::from_file_or_default(&args.config)
        .await
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    let mut server_config = ServerConfig::from_settings(&config.server)?
        .with_logging(!args.no_request_log);
    if let Some(bind) = &args.bind {
        server_config = server_config.with_bind_addr_str(bind)?;
    }

    let service = ChatService::from_config(&config).context("Failed to initialize chat service")?;

    log::info!("Starting Parley server...");
    log::info!("Configuration:");
    log::info!("  Bind address: {}", server_config.bind_addr);
    log::info!("  Model: {}", config.llm.model);
    log::info!(
        "  CORS origins: {}",
        server_config
            .cors_origins
            .as_ref()
            .map(|o| o.join(", "))
            .unwrap_or_else(|| "any".to_string())
    );

    ParleyServer::with_config(Arc::new(service), server_config)
        .serve_with_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
