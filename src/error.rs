//! Error types for thot
//!
//! Provides a unified error type for transport, protocol and configuration
//! failures, plus the decoder's own error type.

use thiserror::Error;

/// Result type alias using ThotError
pub type Result<T> = std::result::Result<T, ThotError>;

/// Unified error type for thot operations
#[derive(Debug, Error)]
pub enum ThotError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Decoder Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl From<bincode::Error> for ThotError {
    fn from(err: bincode::Error) -> Self {
        ThotError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ThotError {
    fn from(err: serde_json::Error) -> Self {
        ThotError::Serialization(err.to_string())
    }
}

/// Failure of a tagged decode. Any of these aborts the whole decode call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The target type's field table cannot drive a decode
    #[error("type {type_name} is not decodable: {reason}")]
    InvalidTarget {
        type_name: &'static str,
        reason: String,
    },

    /// A tagged key held a value that does not convert to the field's kind
    #[error("field '{field}' is not a valid {expected}")]
    FieldTypeMismatch {
        field: String,
        expected: &'static str,
    },
}
