// ============================================
// File: crates/securetalk-core/src/crypto/keys.rs
// ============================================
//! # Pre-Shared Key Type
//!
//! ## Creation Reason
//! Defines the single symmetric key every participant of a session shares,
//! with proper security properties (Zeroize on drop, redacted Debug).
//!
//! ## Main Functionality
//! - `SharedKey`: 16-byte ASCON-128 key
//! - Deterministic derivation from a passphrase (SHA-256, truncated)
//! - Fresh random key generation for out-of-band distribution
//!
//! ## Key Lifecycle
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  SharedKey (Per-session, static)                           │
//! │  ├─ Derived once per process from the passphrase           │
//! │  ├─ Identical across all participants of a session         │
//! │  ├─ Never serialized to the wire                           │
//! │  └─ Zeroed on drop                                         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The key MUST NEVER be logged or written to the wire
//! - There is no rotation mechanism; changing the passphrase is the only
//!   way to retire a key, and it requires redistributing it out of band
//!
//! ## Last Modified
//! v0.1.0 - Initial key type definition

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::KEY_SIZE;

// ============================================
// Constants
// ============================================

/// Build-time default passphrase for demo deployments.
///
/// Real deployments override this on the command line; all participants of
/// one session must agree on the value out of band.
pub const DEFAULT_PASSPHRASE: &str = "SecureTalkDemo2024";

// ============================================
// SharedKey
// ============================================

/// The pre-shared symmetric key for one chat session.
///
/// # Purpose
/// All confidentiality in SecureTalk comes from this key: the transport is
/// plain TCP and the relay forwards ciphertext it cannot read.
///
/// # Security
/// - Zeroed on drop
/// - `Debug` output is redacted
/// - Derivation is deterministic so participants need no key exchange
///
/// # Example
/// ```
/// use securetalk_core::crypto::SharedKey;
///
/// let a = SharedKey::derive("correct horse battery staple");
/// let b = SharedKey::derive("correct horse battery staple");
/// assert_eq!(a.as_bytes(), b.as_bytes());
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; KEY_SIZE]);

impl SharedKey {
    /// Derives the session key from a passphrase.
    ///
    /// SHA-256 of the passphrase, truncated to the ASCON-128 key size.
    /// Deterministic: every participant configured with the same passphrase
    /// derives the same key without a handshake.
    #[must_use]
    pub fn derive(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&digest[..KEY_SIZE]);
        Self(key)
    }

    /// Generates a fresh random key from the OS random number generator.
    ///
    /// For deployments that distribute raw key material out of band instead
    /// of a passphrase.
    #[must_use]
    pub fn random() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Creates a key from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedKey(<redacted>)")
    }
}

// ============================================
// Tests
// ============================================
