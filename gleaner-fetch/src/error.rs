//! Fetch error types.

use gleaner_core::{Category, CoreError};
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for transport and fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Construction-time or data error from the core crate.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-retryable error status.
    #[error("HTTP {status} error for {url}")]
    Http {
        /// Status code returned by the server.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A retryable failure persisted past the retry budget.
    #[error("Retries exhausted after {attempts} attempts for {url}")]
    RetryExhausted {
        /// Requested URL.
        url: String,
        /// Last status seen, if the server answered at all.
        status: Option<u16>,
        /// Attempts made, including the first.
        attempts: u32,
    },

    /// The target URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A payload lacked the structure the parser expects.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A payload was not valid JSON.
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive record/replay failed.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// The backend does not produce the requested category.
    #[error("Category '{category}' not supported by {backend}")]
    UnsupportedCategory {
        /// Backend name.
        backend: String,
        /// Requested category.
        category: Category,
    },

    /// Replay was requested from a backend that does not archive.
    #[error("{0} does not support archiving")]
    ArchivingNotSupported(String),
}

impl FetchError {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            FetchError::RetryExhausted { status, .. } => *status,
            FetchError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true for errors caused by invalid configuration.
    pub fn is_config(&self) -> bool {
        match self {
            FetchError::Core(e) => e.is_config(),
            FetchError::InvalidUrl(_) | FetchError::UnsupportedCategory { .. } => true,
            _ => false,
        }
    }
}

// ============================================================================
// Archive Error
// ============================================================================

/// Error type for archive record/replay.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Replay found no response recorded for the request.
    #[error("No archived response matches {url} (signature {signature})")]
    NoMatchingRecord {
        /// Hash of the request signature.
        signature: String,
        /// Requested URL.
        url: String,
    },

    /// Replay was requested but no archive is attached.
    #[error("Archive instance was not provided")]
    NotProvided,

    /// The storage engine failed.
    #[error("Archive storage error: {0}")]
    Storage(String),

    /// A record could not be (de)serialized.
    #[error("Archive serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
