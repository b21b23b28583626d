//! CLI module for Wayfarer
//!
//! - `serve`: run the HTTP server (default)
//! - `doctor`: configuration and connectivity diagnostics

use clap::{Parser, Subcommand};

pub mod doctor;

/// Wayfarer travel assistant CLI
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(about = "LLM-driven travel and location assistant")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve {
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run configuration and connectivity diagnostics
    Doctor,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve { port }) => crate::server::run(port).await,
        Some(Commands::Doctor) => doctor::run().await,
        None => crate::server::run(None).await,
    }
}
