// ============================================
// File: crates/securetalk-client/src/error.rs
// ============================================
//! # Client Error Types
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use securetalk_core::error::CoreError;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client error types.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Could not reach the relay server.
    #[error("Failed to connect to {addr}: {reason}")]
    Connect {
        /// Address that was dialed
        addr: String,
        /// Why the connection failed
        reason: String,
    },

    /// Error from the core framing or encryption layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Transport I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Creates a `Connect` error.
    pub fn connect(addr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connect {
            addr: addr.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::connect("127.0.0.1:9999", "connection refused");
        assert!(err.to_string().contains("127.0.0.1:9999"));
    }

    #[test]
    fn test_core_error_conversion() {
        let err: ClientError = CoreError::Authentication.into();
        assert!(matches!(err, ClientError::Core(CoreError::Authentication)));
    }
}
