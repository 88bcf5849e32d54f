// ============================================
// File: crates/securetalk-server/src/lib.rs
// ============================================
//! # SecureTalk Relay Server Library
//!
//! ## Creation Reason
//! Provides the broadcast relay at the center of every SecureTalk session:
//! it accepts TCP connections and fans every received frame out to all
//! other connected peers, without ever decrypting a payload.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`config`]: Server configuration management
//! - [`server`]: Accept loop and per-connection relay tasks
//! - [`registry`]: Live-connection bookkeeping for broadcast fan-out
//! - [`error`]: Server-specific error types
//!
//! ## Architecture Overview
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      SecureTalk Relay                         │
//! ├───────────────────────────────────────────────────────────────┤
//! │                                                               │
//! │  ┌────────────┐        ┌──────────────────────────────────┐  │
//! │  │ Accept     │ spawns │ Per-connection tasks             │  │
//! │  │ Loop       │───────►│  reader: read_frame → broadcast  │  │
//! │  └────────────┘        │  writer: queue → write_frame     │  │
//! │                        └───────────────┬──────────────────┘  │
//! │                                        │                     │
//! │                                        ▼                     │
//! │                        ┌──────────────────────────────────┐  │
//! │                        │ ConnectionRegistry (DashMap)     │  │
//! │                        │  register / remove / broadcast   │  │
//! │                        └──────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//! ```text
//! Peer A → frame → reader task → registry.broadcast
//!                                   │ (skip sender)
//!                  Peer B writer ◄──┤
//!                  Peer C writer ◄──┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The relay never holds key material; payloads are opaque bytes
//! - No error on one connection may stop the accept loop
//! - Each connection's write half is owned by exactly one writer task;
//!   everything else talks to it through its queue
//!
//! ## Last Modified
//! v0.1.0 - Initial relay implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod registry;
pub mod server;

// Re-export primary types
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use registry::{ConnectionRegistry, PeerId};
pub use server::{Server, ShutdownHandle};
