//! Archive record/replay contract.
//!
//! An archive stores the outcome of each request keyed by its signature. In
//! record mode the transport writes every answer the server gave through to
//! the archive, error statuses included; in replay mode it never touches the
//! network and serves the recorded outcome instead, so a replayed run fails
//! exactly where the recorded one did.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write};
use std::sync::Arc;

use async_trait::async_trait;
use ring::digest::{digest, SHA256};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::client::RawResponse;
use crate::error::{ArchiveError, FetchError};

/// Headers that never take part in a request signature.
const VOLATILE_HEADERS: &[&str] = &["authorization", "user-agent", "date", "cookie"];

// ============================================================================
// Request Signature
// ============================================================================

/// Identity of a request for archive lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestSignature {
    /// HTTP method.
    pub method: String,
    /// Full URL including the query string.
    pub url: String,
    /// Relevant headers, lowercased and sorted.
    pub headers: BTreeMap<String, String>,
}

impl RequestSignature {
    /// Creates the signature of a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Adds a header unless it is volatile or secret.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        if !VOLATILE_HEADERS.contains(&name.as_str()) {
            self.headers.insert(name, value.into());
        }
        self
    }

    /// Returns the SHA-256 hex digest identifying this signature.
    pub fn hashcode(&self) -> String {
        let mut canonical = format!("{}\n{}", self.method, self.url);
        for (name, value) in &self.headers {
            let _ = write!(canonical, "\n{name}:{value}");
        }

        let hash = digest(&SHA256, canonical.as_bytes());
        let mut hex = String::with_capacity(64);
        for byte in hash.as_ref() {
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}

// ============================================================================
// Archived Outcome
// ============================================================================

/// What the server answered to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArchivedOutcome {
    /// A successful response.
    Response(RawResponse),
    /// A non-retryable error status.
    HttpError {
        /// Status code returned by the server.
        status: u16,
        /// Requested URL.
        url: String,
    },
    /// A retryable failure that outlasted the retry budget.
    RetryExhausted {
        /// Requested URL.
        url: String,
        /// Last status seen, if the server answered at all.
        status: Option<u16>,
        /// Attempts made, including the first.
        attempts: u32,
    },
}

impl ArchivedOutcome {
    /// Converts a transport result into its archived form.
    ///
    /// Returns `None` for failures that are not an answer from the server,
    /// such as an unreadable body or an invalid URL.
    pub fn from_result(result: &Result<RawResponse, FetchError>) -> Option<Self> {
        match result {
            Ok(response) => Some(Self::Response(response.clone())),
            Err(FetchError::Http { status, url }) => Some(Self::HttpError {
                status: *status,
                url: url.clone(),
            }),
            Err(FetchError::RetryExhausted {
                url,
                status,
                attempts,
            }) => Some(Self::RetryExhausted {
                url: url.clone(),
                status: *status,
                attempts: *attempts,
            }),
            Err(_) => None,
        }
    }

    /// Rebuilds the transport result this outcome was recorded from.
    pub fn into_result(self) -> Result<RawResponse, FetchError> {
        match self {
            Self::Response(response) => Ok(response),
            Self::HttpError { status, url } => Err(FetchError::Http { status, url }),
            Self::RetryExhausted {
                url,
                status,
                attempts,
            } => Err(FetchError::RetryExhausted {
                url,
                status,
                attempts,
            }),
        }
    }
}

impl From<RawResponse> for ArchivedOutcome {
    fn from(response: RawResponse) -> Self {
        Self::Response(response)
    }
}

// ============================================================================
// Archive Trait
// ============================================================================

/// Storage for recorded request outcomes.
#[async_trait]
pub trait Archive: Send + Sync {
    /// Durably stores the outcome of a request.
    async fn record(
        &self,
        signature: &RequestSignature,
        outcome: &ArchivedOutcome,
    ) -> Result<(), ArchiveError>;

    /// Returns the outcome recorded for a request.
    ///
    /// Fails with [`ArchiveError::NoMatchingRecord`] when nothing matches.
    async fn replay(&self, signature: &RequestSignature) -> Result<ArchivedOutcome, ArchiveError>;
}

// ============================================================================
// Archive Mode
// ============================================================================

/// How a transport interacts with an archive during one run.
#[derive(Clone, Default)]
pub enum ArchiveMode {
    /// Live requests, nothing recorded.
    #[default]
    Disabled,
    /// Live requests, every server answer written through.
    Record(Arc<dyn Archive>),
    /// No network; responses served from the archive.
    Replay(Arc<dyn Archive>),
}

impl ArchiveMode {
    /// Returns true when responses come from the archive.
    pub fn is_replay(&self) -> bool {
        matches!(self, ArchiveMode::Replay(_))
    }
}

impl fmt::Debug for ArchiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveMode::Disabled => f.write_str("Disabled"),
            ArchiveMode::Record(_) => f.write_str("Record"),
            ArchiveMode::Replay(_) => f.write_str("Replay"),
        }
    }
}

// ============================================================================
// Memory Archive
// ============================================================================

/// In-memory archive, mostly useful for tests and one-shot replays.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    records: RwLock<HashMap<String, ArchivedOutcome>>,
}

impl MemoryArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded outcomes.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true when nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl Archive for MemoryArchive {
    async fn record(
        &self,
        signature: &RequestSignature,
        outcome: &ArchivedOutcome,
    ) -> Result<(), ArchiveError> {
        self.records
            .write()
            .await
            .insert(signature.hashcode(), outcome.clone());
        Ok(())
    }

    async fn replay(&self, signature: &RequestSignature) -> Result<ArchivedOutcome, ArchiveError> {
        let hashcode = signature.hashcode();
        self.records
            .read()
            .await
            .get(&hashcode)
            .cloned()
            .ok_or_else(|| ArchiveError::NoMatchingRecord {
                signature: hashcode,
                url: signature.url.clone(),
            })
    }
}
