//! Interviews server binary entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interviews_api::config::{ServerConfig, StoreKind};
use interviews_api::Server;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Interviews server CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "interviews-server")]
#[command(about = "REST backend for interviews, comments and favorites")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory for persistence (overrides the config file).
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// HTTP API listen address (overrides the config file).
    #[arg(short = 'l', long)]
    listen: Option<SocketAddr>,

    /// Storage backend (overrides the config file).
    #[arg(long, value_enum)]
    store: Option<StoreKind>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Print a signed token for a user, registering the user if needed.
    Token {
        #[arg(short, long)]
        username: String,
    },
}

fn load_config(args: &Args) -> Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };

    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(listen) = args.listen {
        config.http_addr = listen;
    }
    if let Some(store) = args.store {
        config.store = store;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let config = load_config(&args)?;
    tracing::info!("Data directory: {:?}", config.data_dir);

    let server = Server::new(config).context("Failed to create server")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => server.run().await,
        Command::Token { username } => {
            let token = server.issue_token(&username).await?;
            println!("{token}");
            Ok(())
        }
    }
}
