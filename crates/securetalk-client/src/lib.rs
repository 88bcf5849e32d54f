// ============================================
// File: crates/securetalk-client/src/lib.rs
// ============================================
//! # SecureTalk Client Library
//!
//! ## Creation Reason
//! Implements the client side of a SecureTalk session: two concurrent
//! loops over one relay connection, encrypting outgoing lines and
//! decrypting incoming frames under the pre-shared key.
//!
//! ## Main Functionality
//! - [`session`]: The send/receive session core, decoupled from the
//!   terminal through channels so tests can drive it over in-memory pipes
//! - [`error`]: Client-specific error types
//!
//! ## Data Flow
//! ```text
//! stdin line ──► outgoing channel ──► encrypt ──► write_frame ──► relay
//! relay ──► read_frame ──► decrypt ──► event channel ──► stdout
//! ```
//! The send loop owns the write half and the receive loop owns the read
//! half of the split connection; the two directions never contend.
//!
//! ## Last Modified
//! v0.1.0 - Initial client implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod session;

// Re-export primary types
pub use error::{ClientError, Result};
pub use session::{Session, SessionEvent, SessionState};
