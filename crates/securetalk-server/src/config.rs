// ============================================
// File: crates/securetalk-server/src/config.rs
// ============================================
//! # Server Configuration
//!
//! ## Creation Reason
//! Centralizes the relay's tunables (listen address, frame ceiling,
//! connection cap) with TOML loading and validation, so deployments don't
//! edit source to change a port.
//!
//! ## Main Functionality
//! - `ServerConfig`: top-level config with section structs
//! - TOML file loading with serde defaults for absent fields
//! - `validate()` pass run after every load
//!
//! ## Example Configuration
//! ```toml
//! [network]
//! listen_addr = "0.0.0.0:9999"
//!
//! [limits]
//! max_frame_size = 16777216
//! max_clients = 0            # 0 = unlimited
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use securetalk_core::framing::DEFAULT_MAX_FRAME_SIZE;

use crate::error::{Result, ServerError};

// ============================================
// ServerConfig
// ============================================

/// Main server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network configuration.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Resource limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or validated.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServerError::config_load(&path_str, e.to_string()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ServerError::config_load(&path_str, e.to_string()))?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parses configuration from a TOML string (useful for testing).
    ///
    /// # Errors
    /// Returns error if the string cannot be parsed or validated.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ServerError::config_load("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        self.network.validate()?;
        self.limits.validate()?;
        Ok(())
    }
}

// ============================================
// NetworkConfig
// ============================================

/// Network configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// TCP listen address.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:9999".parse().unwrap()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl NetworkConfig {
    fn validate(&self) -> Result<()> {
        // Port 0 is deliberately allowed: the OS picks an ephemeral port,
        // which the integration tests depend on.
        Ok(())
    }
}

// ============================================
// LimitsConfig
// ============================================

/// Resource limit configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Ceiling on the payload length accepted from any peer.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,

    /// Maximum simultaneous connections; 0 means unlimited.
    #[serde(default)]
    pub max_clients: usize,
}

fn default_max_frame_size() -> usize {
    DEFAULT_MAX_FRAME_SIZE
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frame_size: default_max_frame_size(),
            max_clients: 0,
        }
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<()> {
        if self.max_frame_size == 0 {
            return Err(ServerError::config_invalid(
                "limits.max_frame_size",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

// ============================================
// LoggingConfig
// ============================================

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (overridable via `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============================================
// Tests
// ============================================
