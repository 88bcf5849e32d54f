// ============================================
// File: crates/securetalk-core/src/error.rs
// ============================================
//! # Core Error Types
//!
//! ## Creation Reason
//! Defines the error taxonomy shared by the framing codec and the
//! encryption layer, so that callers can tell a recoverable bad message
//! apart from a dead connection.
//!
//! ## Main Functionality
//! - `CoreError`: Primary error enum for framing and crypto operations
//! - `Result<T>`: Crate-wide result alias
//! - Classification helpers for the receive-loop recovery policy
//!
//! ## Error Categories
//! 1. **Framing errors**: oversized or truncated frames, transport I/O
//! 2. **Blob errors**: malformed encoding, sub-floor length, bad UTF-8
//! 3. **Crypto errors**: authentication (tag) failure
//!
//! ## ⚠️ Important Note for Next Developer
//! - NEVER include key material or plaintext in error messages
//! - `Authentication` deliberately carries no detail: a tag failure from
//!   tampering and one from a wrong key are indistinguishable by design
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

// ============================================
// CoreError
// ============================================

/// Core error types for framing and message encryption.
#[derive(Error, Debug)]
pub enum CoreError {
    // ========================================
    // Framing Errors
    // ========================================

    /// Advertised frame length exceeds the configured ceiling.
    #[error("Frame too large: max {max} bytes, got {actual}")]
    FrameTooLarge {
        /// Maximum allowed payload length
        max: usize,
        /// Length advertised by the peer
        actual: usize,
    },

    /// Connection closed in the middle of a frame.
    ///
    /// Distinct from a clean close between frames, which `read_frame`
    /// reports as `Ok(None)` rather than an error.
    #[error("Truncated frame: expected {expected} payload bytes, connection closed early")]
    TruncatedFrame {
        /// Payload length the prefix promised
        expected: usize,
    },

    /// Transport read or write failure.
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================
    // Blob Errors
    // ========================================

    /// Encrypted blob cannot be decoded or is below the structural floor.
    ///
    /// Covers bad base64, decoded length under `MIN_BLOB_SIZE`, and
    /// non-UTF-8 plaintext after a successful open.
    #[error("Malformed blob: {reason}")]
    MalformedBlob {
        /// What's wrong with the blob
        reason: String,
    },

    // ========================================
    // Crypto Errors
    // ========================================

    /// Encryption operation failed.
    #[error("Encryption failed: {context}")]
    Encryption {
        /// What was being encrypted
        context: String,
    },

    /// AEAD tag verification failed (tampered, corrupted, or wrong key).
    #[error("Decryption failed: authentication error")]
    Authentication,
}

impl CoreError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `MalformedBlob` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedBlob {
            reason: reason.into(),
        }
    }

    /// Creates a `FrameTooLarge` error.
    #[must_use]
    pub const fn frame_too_large(max: usize, actual: usize) -> Self {
        Self::FrameTooLarge { max, actual }
    }

    /// Creates an `Encryption` error.
    pub fn encryption(context: impl Into<String>) -> Self {
        Self::Encryption {
            context: context.into(),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if a receive loop should recover and continue.
    ///
    /// Bad blobs and failed authentication affect one message only; the
    /// session stays alive. Everything else means the connection itself is
    /// compromised or gone.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedBlob { .. } | Self::Authentication)
    }

    /// Returns `true` if this error might indicate an attack.
    ///
    /// These errors warrant additional logging/monitoring.
    #[must_use]
    pub const fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Self::Authentication | Self::MalformedBlob { .. } | Self::FrameTooLarge { .. }
        )
    }
}

// ============================================
// Tests
// ============================================
