//! Wayfarer - LLM-driven travel and location assistant
//!
//! CLI entry point for the Wayfarer server.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wayfarer=info,wayfarer_core=info,tower_http=info".into());

    let json_logs = std::env::var("WAYFARER_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let cli = cli::Cli::parse();

    if !std::path::Path::new(".env").exists() {
        warn!(".env file not found. Set GOOGLE_API_KEY and AMAP_MCP_KEY in the environment.");
    }

    cli::run(cli).await
}
