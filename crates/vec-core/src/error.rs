//! Error types for the VEC market simulation

use thiserror::Error;

use crate::types::ServerKind;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, VecError>;

/// Core error type for VEC model operations
#[derive(Error, Debug)]
pub enum VecError {
    /// Malformed entity registry or simulation config
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Spectral-efficiency log argument is not positive (or the interference
    /// denominator vanished)
    #[error("Domain error: log2 argument {argument} for UE {ue} on {kind} server {server}")]
    Domain {
        ue: usize,
        server: usize,
        kind: ServerKind,
        argument: f64,
    },

    /// Latency requested for a UE/server pair with nothing allocated
    #[error("Division by zero: UE {ue} has zero {quantity} on {kind} server {server}")]
    DivisionByZero {
        ue: usize,
        server: usize,
        kind: ServerKind,
        quantity: &'static str,
    },

    /// Action does not match the registry shape or holds out-of-range shares
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Index past the end of a UE or server collection
    #[error("Unknown {what} index {index}")]
    UnknownEntity { what: &'static str, index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VecError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invalid-action error
    pub fn invalid_action(msg: impl Into<String>) -> Self {
        Self::InvalidAction(msg.into())
    }
}
