mod client;
mod config;
mod error;
mod handlers;
mod models;
mod services;
#[cfg(feature = "web-server")]
mod server; // Upload page + analyze endpoint

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;

use config::Config;

#[derive(Parser)]
#[command(name = "nutrisnap", version, about = "Photo in, nutrition facts out")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Send a photo to a running server and print the result
    Analyze {
        /// Image file to analyze
        file: PathBuf,
        /// Base URL of the NutriSnap server
        #[arg(long, env = "NUTRISNAP_SERVER", default_value = "http://localhost:3000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables before anything reads them
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            run_server().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Analyze { file, server } => {
            let state = client::analyze_file(&server, &file).await?;
            if matches!(state, client::ViewState::Error { .. }) {
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(feature = "web-server")]
async fn run_server() -> Result<()> {
    log::info!("🚀 Starting NutriSnap...");

    let config = Config::from_env()?;
    log::info!(
        "✅ Configuration loaded (mode: {:?}, timeout: {:?}, max upload: {} bytes)",
        config.mode,
        config.http_timeout,
        config.max_upload_bytes
    );

    server::serve(&config).await
}

#[cfg(not(feature = "web-server"))]
async fn run_server() -> Result<()> {
    let _ = Config::from_env()?;
    anyhow::bail!("nutrisnap was built without the web-server feature")
}
