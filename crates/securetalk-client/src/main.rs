// ============================================
// File: crates/securetalk-client/src/main.rs
// ============================================
//! # SecureTalk Client Entry Point
//!
//! ## Creation Reason
//! Terminal front end for a SecureTalk session: CLI parsing, key
//! derivation, and the wiring between stdin/stdout and the session core.
//!
//! ## Usage
//! ```bash
//! # Connect to a local relay with the default passphrase
//! securetalk-client
//!
//! # Explicit relay and passphrase
//! securetalk-client --server chat.example.net:9999 --passphrase "our secret"
//! ```
//! Type messages and press Enter to send; type `exit` to leave.
//!
//! ## ⚠️ Important Note for Next Developer
//! - The passphrase is taken on the command line; it shows up in shell
//!   history and process listings, which is acceptable for a demo key only
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use securetalk_client::{ClientError, Session, SessionEvent};
use securetalk_core::crypto::SharedKey;
use securetalk_core::DEFAULT_PASSPHRASE;

// ============================================
// CLI Definition
// ============================================

/// SecureTalk end-to-end encrypted chat client.
#[derive(Parser, Debug)]
#[command(name = "securetalk-client")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Relay server address
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    server: String,

    /// Session passphrase; all participants must use the same one
    #[arg(short, long, default_value = DEFAULT_PASSPHRASE)]
    passphrase: String,
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging();

    let key = SharedKey::derive(&cli.passphrase);
    println!("[*] Using shared ASCON-AEAD128 key for this session.");

    let stream = TcpStream::connect(&cli.server)
        .await
        .map_err(|e| ClientError::connect(&cli.server, e.to_string()))?;
    println!("[*] Connected to SecureTalk relay at {}.", cli.server);
    println!("Type messages below (type 'exit' to quit):\n");

    let (read_half, write_half) = stream.into_split();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();

    let session = Session::spawn(read_half, write_half, key, out_rx, ev_tx);

    // Incoming events → terminal.
    let printer = tokio::spawn(async move {
        while let Some(event) = ev_rx.recv().await {
            match event {
                SessionEvent::Message(text) => println!("\nFriend: {text}"),
                SessionEvent::DecryptFailed(e) => {
                    println!("\n[!] Failed to decrypt message: {e}");
                }
                SessionEvent::Disconnected => {
                    println!("[!] Connection lost.");
                    break;
                }
            }
        }
    });

    // stdin lines → session.
    let stdin_task = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let is_exit = line.trim().eq_ignore_ascii_case("exit");
            if !is_exit {
                println!("You: {line}");
            }
            if out_tx.send(line).is_err() || is_exit {
                break;
            }
        }
    });

    session.wait().await?;
    println!("[*] Disconnected.");

    printer.abort();
    stdin_task.abort();
    Ok(())
}

// ============================================
// Helper Functions
// ============================================

/// Initializes the tracing subscriber.
///
/// Defaults to warnings only so log lines don't interleave with chat
/// output; `RUST_LOG` overrides.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .ok();
}
