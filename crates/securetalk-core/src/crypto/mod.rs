// ============================================
// File: crates/securetalk-core/src/crypto/mod.rs
// ============================================
//! # Cryptography Module
//!
//! ## Creation Reason
//! Centralizes the message encryption used by every SecureTalk client,
//! using the audited RustCrypto implementation of ASCON-AEAD128.
//!
//! ## Main Functionality
//!
//! ### Submodules
//! - [`keys`]: The pre-shared key type and passphrase derivation
//! - [`seal`]: Text encryption/decryption to and from transportable blobs
//!
//! ## Cryptographic Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Key Setup (out of band)                  │
//! │                                                             │
//! │   passphrase ──► SHA-256 ──► truncate(16) ──► SharedKey     │
//! │                                                             │
//! │   Every participant configured with the same passphrase     │
//! │   derives the same key; no handshake, no wire exchange.     │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Message Sealing                          │
//! │                                                             │
//! │   SharedKey + random Nonce ──► ASCON-128 ──► ciphertext+tag │
//! │   blob = base64( nonce(16) || ciphertext+tag )              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//! - **Confidentiality**: ASCON-128 authenticated encryption
//! - **Integrity**: 16-byte authentication tag
//! - **End-to-end**: the relay sees only opaque blobs
//!
//! Deliberately absent (single static shared key by design): per-user
//! authentication, forward secrecy, replay protection, key rotation.
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL implementations use RustCrypto (audited)
//! - NEVER roll your own crypto
//! - The key type implements Zeroize
//! - Nonce uniqueness rests on the OS RNG; see [`seal::encrypt`]
//!
//! ## Last Modified
//! v0.1.0 - Initial crypto implementation

pub mod keys;
pub mod seal;

// Re-export primary items at module level
pub use keys::{SharedKey, DEFAULT_PASSPHRASE};
pub use seal::{decrypt, encrypt};

// ============================================
// Constants
// ============================================

/// Size of the ASCON-128 key in bytes.
pub const KEY_SIZE: usize = 16;

/// Size of the ASCON-128 nonce in bytes.
pub const NONCE_SIZE: usize = 16;

/// Size of the ASCON-128 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Minimum decoded blob length: nonce plus tag, even for empty plaintext.
///
/// Anything shorter is corrupt by construction and is rejected before the
/// AEAD is ever invoked.
pub const MIN_BLOB_SIZE: usize = NONCE_SIZE + TAG_SIZE;
