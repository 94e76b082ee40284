//! Core error types for gleaner.

use thiserror::Error;

/// Core error type for gleaner operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid construction-time configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Category name that no backend declares.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Invalid data handed to a core helper.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns true for errors raised while validating configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, CoreError::InvalidConfig(_) | CoreError::UnknownCategory(_))
    }
}
