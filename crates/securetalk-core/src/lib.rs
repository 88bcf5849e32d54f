// ============================================
// File: crates/securetalk-core/src/lib.rs
// ============================================
//! # SecureTalk Core - Framing & Encryption Library
//!
//! ## Creation Reason
//! Provides the two contracts every SecureTalk participant shares: the
//! length-prefixed wire framing and the authenticated message encryption.
//! The relay server uses only the framing half; clients (and the web room
//! layer, which consumes this crate as a plain library) use both.
//!
//! ## Main Functionality
//!
//! ### Framing Module ([`framing`])
//! - `write_frame` / `read_frame`: 4-byte big-endian length prefix codec
//! - Clean-EOF vs. mid-frame truncation distinction
//! - Configurable ceiling on advertised frame lengths
//!
//! ### Crypto Module ([`crypto`])
//! - `SharedKey`: 16-byte pre-shared key, derived from a passphrase
//! - `encrypt` / `decrypt`: ASCON-AEAD128 sealed text blobs
//! - Base64 blob encoding: `nonce(16) || ciphertext+tag`
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │   securetalk-server          securetalk-client      │
//! │   (framing only —            (framing + crypto)     │
//! │    relays opaque blobs)              │              │
//! │         │                            │              │
//! │         └──────────┬─────────────────┘              │
//! │                    ▼                                │
//! │             securetalk-core   ← You are here        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Guarantees
//! - **Confidentiality**: ASCON-AEAD128 authenticated encryption
//! - **Integrity**: 16-byte authentication tag on every message
//! - **End-to-end**: the relay never holds the key and never decrypts
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALL cryptographic code uses the audited RustCrypto implementation
//! - NEVER implement custom crypto primitives
//! - The key type implements Zeroize for secure cleanup
//! - The blob format is shared with the web room layer; changing it breaks
//!   every deployed participant
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crypto;
pub mod error;
pub mod framing;

// Re-export commonly used items
pub use crypto::{decrypt, encrypt, SharedKey, DEFAULT_PASSPHRASE};
pub use error::{CoreError, Result};
pub use framing::{read_frame, write_frame, DEFAULT_MAX_FRAME_SIZE};
