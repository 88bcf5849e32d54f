// ============================================
// File: crates/securetalk-server/src/main.rs
// ============================================
//! # SecureTalk Relay Server Entry Point
//!
//! ## Creation Reason
//! Binary entry point for the relay: CLI parsing, logging setup,
//! configuration loading, and server execution.
//!
//! ## Usage
//! ```bash
//! # Start with defaults (0.0.0.0:9999)
//! securetalk-server start
//!
//! # Start with a config file
//! securetalk-server start --config /etc/securetalk/server.toml
//!
//! # Check a config file without starting
//! securetalk-server validate --config /etc/securetalk/server.toml
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The relay holds no key material; there is nothing secret to
//!   configure here
//! - `RUST_LOG` overrides the configured log level
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use securetalk_server::{Server, ServerConfig};

// ============================================
// CLI Definition
// ============================================

/// SecureTalk broadcast relay server.
#[derive(Parser, Debug)]
#[command(name = "securetalk-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the relay server
    Start {
        /// Path to configuration file (defaults apply if absent)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start { config } => cmd_start(config).await,
        Commands::Validate { config } => cmd_validate(config).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Starts the relay server.
async fn cmd_start(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = match &config_path {
        Some(path) if path.exists() => ServerConfig::load(path).await?,
        Some(path) => {
            eprintln!("Config file {} not found, using defaults", path.display());
            ServerConfig::default()
        }
        None => ServerConfig::default(),
    };

    // The subscriber can only be installed once, so the configured level
    // has to be known before this point.
    init_logging(&config.logging.level);

    info!("[*] SecureTalk relay starting...");

    let server = Server::bind(config).await?;
    let handle = server.shutdown_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            handle.shutdown();
        }
    });

    server.run().await?;
    Ok(())
}

/// Validates a configuration file.
async fn cmd_validate(config_path: PathBuf) -> anyhow::Result<()> {
    init_logging("warn");

    if !config_path.exists() {
        println!("Config file not found: {}", config_path.display());
        println!("The server would fall back to default values.");
        return Ok(());
    }

    let config = ServerConfig::load(&config_path).await?;

    println!("Configuration is valid");
    println!();
    println!("Network:");
    println!("   Listen:          {}", config.network.listen_addr);
    println!();
    println!("Limits:");
    println!("   Max frame size:  {} bytes", config.limits.max_frame_size);
    if config.limits.max_clients == 0 {
        println!("   Max clients:     unlimited");
    } else {
        println!("   Max clients:     {}", config.limits.max_clients);
    }

    Ok(())
}

// ============================================
// Helper Functions
// ============================================

/// Initializes the tracing subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}
