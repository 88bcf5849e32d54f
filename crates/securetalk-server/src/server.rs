// ============================================
// File: crates/securetalk-server/src/server.rs
// ============================================
//! # Relay Server Orchestrator
//!
//! ## Creation Reason
//! Main server implementation: accepts connections, runs one relay task
//! per connection, and coordinates shutdown.
//!
//! ## Main Functionality
//! - `Server`: bind → run → shutdown lifecycle
//! - Accept loop with connection-cap enforcement
//! - Per-connection reader task (frame in → broadcast) and writer task
//!   (queue → frame out)
//!
//! ## Connection Lifecycle
//! ```text
//! ┌────────────┐  accept   ┌────────────┐  register  ┌──────────────┐
//! │ Connecting │──────────►│ Registered │───────────►│ RelayingLoop │──┐
//! └────────────┘           └────────────┘            └──────┬───────┘  │
//!                                                           │ ▲        │
//!                                                           └─┘ frame  │
//!                                        EOF / frame error            │
//!                                                           ┌─────────▼┐
//!                                              deregister,  │ Closing  │
//!                                              close socket └────┬─────┘
//!                                                                ▼
//!                                                           ┌─────────┐
//!                                                           │ Removed │
//!                                                           └─────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The relay forwards payloads verbatim; it MUST NOT decrypt or parse
//!   them (end-to-end confidentiality depends on this)
//! - A write failure to one peer evicts that peer only; the broadcast to
//!   the others continues
//! - There is no departure announcement to other peers; that is a
//!   protocol decision, not a missing feature
//!
//! ## Last Modified
//! v0.1.0 - Initial relay implementation

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use securetalk_core::framing::{read_frame, write_frame};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::registry::{ConnectionRegistry, PeerId};

// ============================================
// Server
// ============================================

/// The SecureTalk relay server.
///
/// # Lifecycle
/// 1. Create with `Server::bind(config).await`
/// 2. Start with `server.run().await`
/// 3. Stop via [`Server::shutdown_handle`] or Ctrl+C in the binary
pub struct Server {
    /// Server configuration.
    config: ServerConfig,
    /// Bound TCP listener.
    listener: TcpListener,
    /// Live-connection registry shared with every connection task.
    registry: Arc<ConnectionRegistry>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

/// Handle for stopping a running server from another task.
#[derive(Debug, Clone)]
pub struct ShutdownHandle(broadcast::Sender<()>);

impl ShutdownHandle {
    /// Signals the server and every connection task to stop.
    pub fn shutdown(&self) {
        let _ = self.0.send(());
    }
}

impl Server {
    /// Binds the listener and prepares the server.
    ///
    /// # Errors
    /// Returns `StartupFailed` if the address cannot be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.network.listen_addr)
            .await
            .map_err(|e| ServerError::startup_failed(format!("TCP bind failed: {e}")))?;

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(
            "SecureTalk relay listening on {}",
            listener.local_addr().map_err(ServerError::Io)?
        );

        Ok(Self {
            config,
            listener,
            registry: Arc::new(ConnectionRegistry::new()),
            shutdown_tx,
        })
    }

    /// Returns the actual bound address (useful with port 0).
    ///
    /// # Errors
    /// Returns `Io` if the socket cannot report its address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(ServerError::Io)
    }

    /// Returns a handle that can stop the server from another task.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(self.shutdown_tx.clone())
    }

    /// Returns the shared connection registry.
    #[must_use]
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Runs the accept loop until shutdown.
    ///
    /// No single connection's failure stops this loop; only the shutdown
    /// signal does.
    ///
    /// # Errors
    /// Returns `Io` only if the listener itself fails irrecoverably.
    pub async fn run(self) -> Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("Accept loop received shutdown signal");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.accept_connection(stream, addr),
                        Err(e) => {
                            // Transient accept failures (e.g. EMFILE) must
                            // not kill the server.
                            warn!("Accept failed: {}", e);
                        }
                    }
                }
            }
        }

        info!("Relay shutting down");
        Ok(())
    }

    /// Registers an accepted connection and spawns its tasks.
    fn accept_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let max_clients = self.config.limits.max_clients;
        if max_clients != 0 && self.registry.count() >= max_clients {
            warn!(%addr, max_clients, "Connection refused: client limit reached");
            drop(stream);
            return;
        }

        info!("[+] New connection from {}", addr);

        let registry = Arc::clone(&self.registry);
        let max_frame = self.config.limits.max_frame_size;
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            handle_connection(stream, addr, registry, max_frame, shutdown_rx).await;
        });
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("listen_addr", &self.config.network.listen_addr)
            .field("connections", &self.registry.count())
            .finish()
    }
}

// ============================================
// Per-Connection Tasks
// ============================================

/// Runs one connection from registration to removal.
///
/// The read half stays here (the relaying loop); the write half moves into
/// a dedicated writer task fed by the registry queue. Deregistration
/// happens exactly once, on whichever path ends the loop.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    max_frame: usize,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let (mut read_half, write_half) = stream.into_split();

    let (tx, rx) = mpsc::unbounded_channel();
    let peer_id = registry.register(addr, tx);

    let writer = tokio::spawn(write_loop(
        write_half,
        rx,
        Arc::clone(&registry),
        peer_id,
        addr,
    ));

    // RelayingLoop: read frames, fan them out undecrypted.
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!(peer = peer_id, "Connection task received shutdown signal");
                break;
            }
            frame = read_frame(&mut read_half, max_frame) => {
                match frame {
                    Ok(Some(payload)) => {
                        let delivered = registry.broadcast(peer_id, &payload);
                        debug!(peer = peer_id, delivered, "Frame relayed");
                    }
                    Ok(None) => {
                        debug!(peer = peer_id, "Peer closed cleanly");
                        break;
                    }
                    Err(e) => {
                        // One connection's framing failure never touches
                        // the others.
                        warn!(peer = peer_id, %addr, "Read failed: {}", e);
                        break;
                    }
                }
            }
        }
    }

    // Closing → Removed: exactly one removal per connection lifetime; the
    // writer may already have evicted us after a send failure, which the
    // idempotent remove absorbs.
    registry.remove(peer_id);
    drop(read_half);
    let _ = writer.await;

    info!("[-] Connection closed: {}", addr);
}

/// Owns a connection's write half and drains its frame queue.
///
/// Frames arrive in broadcast order and are written one at a time, so two
/// frames are never interleaved on the wire. On a write failure the peer
/// is evicted and the rest of the queue is dropped with the task.
async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<Bytes>,
    registry: Arc<ConnectionRegistry>,
    peer_id: PeerId,
    addr: SocketAddr,
) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = write_frame(&mut write_half, &frame).await {
            debug!(peer = peer_id, %addr, "Write failed, evicting peer: {}", e);
            registry.remove(peer_id);
            break;
        }
    }
    debug!(peer = peer_id, "Writer task exiting");
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig::parse(
            r#"
            [network]
            listen_addr = "127.0.0.1:0"
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_bind_reports_ephemeral_port() {
        let server = Server::bind(test_config()).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_run() {
        let server = Server::bind(test_config()).await.unwrap();
        let handle = server.shutdown_handle();

        let run = tokio::spawn(server.run());
        handle.shutdown();

        let result = tokio::time::timeout(std::time::Duration::from_secs(1), run)
            .await
            .expect("run did not stop after shutdown")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_client_limit_refuses_excess_connections() {
        let config = ServerConfig::parse(
            r#"
            [network]
            listen_addr = "127.0.0.1:0"

            [limits]
            max_clients = 1
            "#,
        )
        .unwrap();

        let server = Server::bind(config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let registry = server.registry();
        let handle = server.shutdown_handle();
        let run = tokio::spawn(server.run());

        let _first = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(registry.count(), 1);

        // The second connection is accepted by the OS but dropped by the
        // relay; reading from it hits EOF.
        let mut second = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 1];
        let n = tokio::io::AsyncReadExt::read(&mut second, &mut buf)
            .await
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(registry.count(), 1);

        handle.shutdown();
        let _ = run.await;
    }
}
