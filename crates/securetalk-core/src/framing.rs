// ============================================
// File: crates/securetalk-core/src/framing.rs
// ============================================
//! # Wire Framing Codec
//!
//! ## Creation Reason
//! TCP is a byte stream; message boundaries have to be reimposed. Every
//! SecureTalk message travels as one length-prefixed frame, and the relay
//! forwards frames without ever looking inside the payload.
//!
//! ## Main Functionality
//! - `write_frame`: length prefix + payload as one logical write
//! - `read_frame`: exact reads, distinguishing clean EOF from truncation
//! - Length ceiling to bound allocation from a hostile prefix
//!
//! ## Wire Format
//! ```text
//! ┌──────────────────────┬──────────────────────────────┐
//! │ Length (4 bytes, BE) │ Payload (Length bytes)       │
//! └──────────────────────┴──────────────────────────────┘
//! ```
//! Frames repeat back to back until the connection closes.
//!
//! ## EOF Semantics
//! - Peer closes before a complete length prefix → `Ok(None)`. This is the
//!   normal close path, not an error.
//! - Peer closes after the prefix but before `Length` payload bytes →
//!   `Err(TruncatedFrame)`. Never surfaced as a valid (empty) frame.
//!
//! ## ⚠️ Important Note for Next Developer
//! - Callers must serialize concurrent `write_frame` calls on one
//!   connection; interleaved prefixes corrupt the stream beyond recovery
//! - The length ceiling is a local hardening measure, not a protocol rule;
//!   both sides of a session may configure it independently
//!
//! ## Last Modified
//! v0.1.0 - Initial framing implementation

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{CoreError, Result};

// ============================================
// Constants
// ============================================

/// Size of the big-endian length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default ceiling on the payload length a reader will accept.
///
/// The wire format itself has no maximum; the ceiling only protects the
/// reader from allocating whatever a malicious prefix advertises.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

// ============================================
// Writing
// ============================================

/// Writes one frame: a 4-byte big-endian length followed by the payload.
///
/// Prefix and payload are assembled into a single buffer and written with
/// one `write_all`, so a frame is never split by another write from the
/// same task. Serializing concurrent writers is the caller's job.
///
/// # Errors
/// - `FrameTooLarge` if the payload cannot be described by a `u32`
/// - `Io` on transport failure
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len())
        .map_err(|_| CoreError::frame_too_large(u32::MAX as usize, payload.len()))?;

    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.put_u32(len);
    buf.put_slice(payload);

    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

// ============================================
// Reading
// ============================================

/// Reads one frame, blocking until a full frame or EOF arrives.
///
/// # Arguments
/// * `reader` - The stream to read from
/// * `max_len` - Ceiling on the advertised payload length
///
/// # Returns
/// - `Ok(Some(payload))` - A complete frame
/// - `Ok(None)` - Peer closed before sending a complete length prefix
///   (clean EOF)
/// - `Err(_)` - Oversized frame, mid-payload close, or transport failure
///
/// # Errors
/// - `FrameTooLarge` if the prefix advertises more than `max_len` bytes
/// - `TruncatedFrame` if the connection closes mid-payload
/// - `Io` on any other transport failure
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(prefix) as usize;
    if len > max_len {
        return Err(CoreError::frame_too_large(max_len, len));
    }

    let mut payload = vec![0u8; len];
    match reader.read_exact(&mut payload).await {
        Ok(_) => Ok(Some(Bytes::from(payload))),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(CoreError::TruncatedFrame { expected: len })
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Round-trips a payload through a duplex pipe small enough to force
    /// fragmentation of both the prefix and the payload.
    async fn roundtrip(payload: Vec<u8>) -> Bytes {
        let (mut a, mut b) = tokio::io::duplex(7);
        let expected_len = payload.len();

        let writer = tokio::spawn(async move {
            write_frame(&mut a, &payload).await.unwrap();
            a
        });

        let got = read_frame(&mut b, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap()
            .expect("frame expected");
        writer.await.unwrap();

        assert_eq!(got.len(), expected_len);
        got
    }

    #[tokio::test]
    async fn test_roundtrip_empty_payload() {
        let got = roundtrip(Vec::new()).await;
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn test_roundtrip_single_byte() {
        let got = roundtrip(vec![0xAB]).await;
        assert_eq!(&got[..], &[0xAB]);
    }

    #[tokio::test]
    async fn test_roundtrip_one_mebibyte() {
        let payload: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();
        let got = roundtrip(payload.clone()).await;
        assert_eq!(&got[..], &payload[..]);
    }

    #[tokio::test]
    async fn test_sequential_frames_preserve_boundaries() {
        let (mut a, mut b) = tokio::io::duplex(64);

        write_frame(&mut a, b"first").await.unwrap();
        write_frame(&mut a, b"").await.unwrap();
        write_frame(&mut a, b"third").await.unwrap();
        drop(a);

        assert_eq!(
            &read_frame(&mut b, 1024).await.unwrap().unwrap()[..],
            b"first"
        );
        assert!(read_frame(&mut b, 1024).await.unwrap().unwrap().is_empty());
        assert_eq!(
            &read_frame(&mut b, 1024).await.unwrap().unwrap()[..],
            b"third"
        );
        assert!(read_frame(&mut b, 1024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clean_eof_before_prefix() {
        let (a, mut b) = tokio::io::duplex(16);
        drop(a);

        let result = read_frame(&mut b, 1024).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_close_mid_prefix_is_clean_eof() {
        let (mut a, mut b) = tokio::io::duplex(16);

        a.write_all(&[0x00, 0x00]).await.unwrap();
        drop(a);

        let result = read_frame(&mut b, 1024).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_close_mid_payload_is_error() {
        let (mut a, mut b) = tokio::io::duplex(64);

        // Prefix promises 10 bytes, only 3 arrive.
        a.write_all(&10u32.to_be_bytes()).await.unwrap();
        a.write_all(b"abc").await.unwrap();
        drop(a);

        let result = read_frame(&mut b, 1024).await;
        assert!(matches!(
            result,
            Err(CoreError::TruncatedFrame { expected: 10 })
        ));
    }

    #[tokio::test]
    async fn test_oversized_length_rejected_before_allocation() {
        let (mut a, mut b) = tokio::io::duplex(64);

        a.write_all(&u32::MAX.to_be_bytes()).await.unwrap();

        let result = read_frame(&mut b, 1024).await;
        assert!(matches!(
            result,
            Err(CoreError::FrameTooLarge { max: 1024, .. })
        ));
    }
}
