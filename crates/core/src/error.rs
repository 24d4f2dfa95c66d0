//! Error types for the Knowledge Hub.
//!
//! This module defines a unified error enum that covers the error categories
//! shared across crates: configuration, I/O, LLM, knowledge, persistence,
//! validation, and serialization errors.

use thiserror::Error;

/// Unified error type for the Knowledge Hub.
///
/// Component-specific failures (readiness, extraction, retrieval) have their
/// own enums in `khub-knowledge`; everything that crosses a crate boundary
/// without a more precise type lands here.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge pipeline and catalog errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Relational store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Caller-correctable input errors
    #[error("{0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error was caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_client_error() {
        assert!(AppError::Validation("bad id".to_string()).is_client_error());
        assert!(!AppError::Database("down".to_string()).is_client_error());
    }

    #[test]
    fn test_validation_message_is_bare() {
        let err = AppError::Validation("the name can be at most 50 characters long".to_string());
        assert_eq!(err.to_string(), "the name can be at most 50 characters long");
    }
}
