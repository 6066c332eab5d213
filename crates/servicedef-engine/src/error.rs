//! Error types for the service definition engine.
//!
//! Normalization, capability derivation and the attribute scan never fail; only
//! document loading, configuration loading and inspector construction do.

use thiserror::Error;

/// Result type for fallible engine operations.
pub type Result<T> = std::result::Result<T, ServiceDefError>;

/// Errors raised while loading or preparing engine inputs.
#[derive(Debug, Error)]
pub enum ServiceDefError {
    /// Document could not be parsed.
    #[error("Failed to parse document: {0}")]
    ParseError(String),

    /// Service definition validation failed.
    #[error("Service definition validation error: {0}")]
    ValidationError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An attribute token pattern could not be compiled.
    #[error("Invalid attribute pattern: {0}")]
    InvalidPattern(String),
}

impl From<serde_json::Error> for ServiceDefError {
    fn from(err: serde_json::Error) -> Self {
        ServiceDefError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ServiceDefError {
    fn from(err: serde_yaml::Error) -> Self {
        ServiceDefError::ParseError(err.to_string())
    }
}

impl From<regex::Error> for ServiceDefError {
    fn from(err: regex::Error) -> Self {
        ServiceDefError::InvalidPattern(err.to_string())
    }
}
