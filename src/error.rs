//! # Error Types
//!
//! Custom error types for TMM Telemetry using `thiserror`.

use thiserror::Error;

use crate::handshake::HandshakeError;
use crate::telemetry::DecodeError;

/// Main error type for TMM Telemetry
#[derive(Debug, Error)]
pub enum TmmError {
    /// Telemetry message could not be decoded
    #[error("Telemetry decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Port handshake URL could not be decoded
    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    /// Handshake payload could not be serialized
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// URL-scheme transport refused the request
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TMM Telemetry
pub type Result<T> = std::result::Result<T, TmmError>;
