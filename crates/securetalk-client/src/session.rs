// ============================================
// File: crates/securetalk-client/src/session.rs
// ============================================
//! # Client Session
//!
//! ## Creation Reason
//! One SecureTalk session is two loops over one duplex connection: a send
//! loop (line → encrypt → frame → write) and a receive loop (read → frame
//! → decrypt → display). Both are kept out of the terminal code and driven
//! by channels, so tests can run a whole session over in-memory pipes.
//!
//! ## Main Functionality
//! - `Session::spawn`: starts both loops over any split transport
//! - `SessionEvent`: what the receive loop reports upward
//! - `SessionState`: observable lifecycle (running → terminated)
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────┐  spawn   ┌─────────┐  EOF, error, or "exit"  ┌────────────┐
//! │ (none)  │─────────►│ Running │────────────────────────►│ Terminated │
//! └─────────┘          └─────────┘                         └────────────┘
//! ```
//! Either loop ending terminates the session; the other loop is torn
//! down with it.
//!
//! ## Recovery Policy
//! A frame that fails to decrypt (tampered, corrupted, wrong key) is
//! reported as an event and the receive loop continues; one bad message
//! never costs the session. Only transport EOF or a framing error ends it.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Only the send loop writes to the transport; if another writer is
//!   ever added, frame writes must be serialized through it
//! - The "exit" keyword is matched case-insensitively after trimming
//!   whitespace; "  EXIT  " ends the session too
//!
//! ## Last Modified
//! v0.1.0 - Initial session implementation

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use securetalk_core::crypto::SharedKey;
use securetalk_core::error::CoreError;
use securetalk_core::framing::{read_frame, write_frame, DEFAULT_MAX_FRAME_SIZE};
use securetalk_core::{decrypt, encrypt};

use crate::error::Result;

// ============================================
// Events & State
// ============================================

/// What the receive loop reports to the user-facing boundary.
#[derive(Debug)]
pub enum SessionEvent {
    /// A message was received and decrypted successfully.
    Message(String),
    /// A frame arrived but could not be decrypted; the session continues.
    DecryptFailed(CoreError),
    /// The connection ended (peer close or transport failure).
    Disconnected,
}

/// Observable session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Both loops are active.
    Running,
    /// The session has ended; no further events will arrive.
    Terminated,
}

// ============================================
// Session
// ============================================

/// A running client session: concurrent send and receive loops sharing
/// one connection and one key.
pub struct Session {
    state_rx: watch::Receiver<SessionState>,
    task: JoinHandle<Result<()>>,
}

impl Session {
    /// Starts the session loops over a split transport.
    ///
    /// # Arguments
    /// * `reader` - Read half of the connection (owned by the receive loop)
    /// * `writer` - Write half of the connection (owned by the send loop)
    /// * `key` - The pre-shared session key
    /// * `outgoing` - Plaintext lines from the user-facing boundary; the
    ///   line `exit` (any case) closes the transport and ends the session
    /// * `events` - Receives decrypted messages and failure reports
    pub fn spawn<R, W>(
        reader: R,
        writer: W,
        key: SharedKey,
        outgoing: mpsc::UnboundedReceiver<String>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (state_tx, state_rx) = watch::channel(SessionState::Running);

        let task = tokio::spawn(async move {
            let mut recv_task = tokio::spawn(receive_loop(reader, key.clone(), events));
            let mut send_task = tokio::spawn(send_loop(writer, key, outgoing));

            // Whichever loop finishes first ends the session.
            let result = tokio::select! {
                recv = &mut recv_task => {
                    send_task.abort();
                    recv.unwrap_or(Ok(()))
                }
                send = &mut send_task => {
                    recv_task.abort();
                    send.unwrap_or(Ok(()))
                }
            };

            let _ = state_tx.send(SessionState::Terminated);
            result
        });

        Self { state_rx, task }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Waits for the session to terminate.
    ///
    /// # Errors
    /// Returns the first transport error either loop hit, if any.
    pub async fn wait(self) -> Result<()> {
        self.task.await.unwrap_or(Ok(()))
    }
}

// ============================================
// Receive Loop
// ============================================

/// Reads frames, decrypts them, and reports events until EOF.
async fn receive_loop<R>(
    mut reader: R,
    key: SharedKey,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    loop {
        match read_frame(&mut reader, DEFAULT_MAX_FRAME_SIZE).await {
            Ok(Some(payload)) => {
                let outcome = std::str::from_utf8(&payload)
                    .map_err(|_| CoreError::malformed("blob is not valid UTF-8 text"))
                    .and_then(|blob| decrypt(&key, blob));

                match outcome {
                    Ok(text) => {
                        if events.send(SessionEvent::Message(text)).is_err() {
                            // Nobody is listening anymore.
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        warn!("Failed to decrypt message: {}", e);
                        if events.send(SessionEvent::DecryptFailed(e)).is_err() {
                            return Ok(());
                        }
                    }
                }
            }
            Ok(None) => {
                debug!("Relay closed the connection");
                let _ = events.send(SessionEvent::Disconnected);
                return Ok(());
            }
            Err(e) => {
                warn!("Connection lost: {}", e);
                let _ = events.send(SessionEvent::Disconnected);
                return Err(e.into());
            }
        }
    }
}

// ============================================
// Send Loop
// ============================================

/// Encrypts and writes outgoing lines until `exit` or channel close.
async fn send_loop<W>(
    mut writer: W,
    key: SharedKey,
    mut outgoing: mpsc::UnboundedReceiver<String>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = outgoing.recv().await {
        if line.trim().eq_ignore_ascii_case("exit") {
            debug!("Exit requested, closing transport");
            break;
        }

        let blob = encrypt(&key, &line)?;
        write_frame(&mut writer, blob.as_bytes()).await?;
    }

    let _ = writer.shutdown().await;
    Ok(())
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use securetalk_core::crypto::NONCE_SIZE;
    use tokio::io::AsyncReadExt;

    fn test_key() -> SharedKey {
        SharedKey::derive("session test passphrase")
    }

    fn wire() -> (
        Session,
        tokio::io::DuplexStream,
        mpsc::UnboundedSender<String>,
        mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        let (ours, theirs) = tokio::io::duplex(64 * 1024);
        let (read_half, write_half) = tokio::io::split(ours);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = mpsc::unbounded_channel();

        let session = Session::spawn(read_half, write_half, test_key(), out_rx, ev_tx);
        (session, theirs, out_tx, ev_rx)
    }

    #[tokio::test]
    async fn test_send_loop_emits_encrypted_frames() {
        let (_session, mut peer, out_tx, _ev_rx) = wire();

        out_tx.send("hello".to_string()).unwrap();

        let frame = read_frame(&mut peer, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap()
            .expect("frame expected");

        // The wire carries a base64 blob, not plaintext.
        let blob = std::str::from_utf8(&frame).unwrap();
        assert!(!blob.contains("hello"));

        let decoded = BASE64.decode(blob).unwrap();
        assert!(decoded.len() >= 32);
        assert_eq!(decrypt(&test_key(), blob).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_receive_loop_decrypts_incoming_frames() {
        let (_session, mut peer, _out_tx, mut ev_rx) = wire();

        let blob = encrypt(&test_key(), "incoming text").unwrap();
        write_frame(&mut peer, blob.as_bytes()).await.unwrap();

        match ev_rx.recv().await {
            Some(SessionEvent::Message(text)) => assert_eq!(text, "incoming text"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_frame_does_not_end_session() {
        let (session, mut peer, _out_tx, mut ev_rx) = wire();

        // Garbage blob, then a good one: the session must survive the
        // first and deliver the second.
        write_frame(&mut peer, b"definitely not base64!!!")
            .await
            .unwrap();
        let blob = encrypt(&test_key(), "still alive").unwrap();
        write_frame(&mut peer, blob.as_bytes()).await.unwrap();

        assert!(matches!(
            ev_rx.recv().await,
            Some(SessionEvent::DecryptFailed(_))
        ));
        match ev_rx.recv().await {
            Some(SessionEvent::Message(text)) => assert_eq!(text, "still alive"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Running);
    }

    #[tokio::test]
    async fn test_tampered_frame_reports_authentication_failure() {
        let (_session, mut peer, _out_tx, mut ev_rx) = wire();

        let blob = encrypt(&test_key(), "target").unwrap();
        let mut decoded = BASE64.decode(&blob).unwrap();
        decoded[NONCE_SIZE] ^= 0x01;
        let tampered = BASE64.encode(&decoded);
        write_frame(&mut peer, tampered.as_bytes()).await.unwrap();

        match ev_rx.recv().await {
            Some(SessionEvent::DecryptFailed(CoreError::Authentication)) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_peer_close_terminates_session() {
        let (session, peer, _out_tx, mut ev_rx) = wire();

        drop(peer);

        assert!(matches!(
            ev_rx.recv().await,
            Some(SessionEvent::Disconnected)
        ));
        session.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_exit_closes_transport_and_terminates() {
        let (session, mut peer, out_tx, _ev_rx) = wire();

        out_tx.send("EXIT".to_string()).unwrap();
        session.wait().await.unwrap();

        // Our write direction is shut; the peer sees EOF.
        let mut buf = [0u8; 1];
        let n = peer.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }
}
