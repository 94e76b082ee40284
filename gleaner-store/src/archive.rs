//! On-disk response archive.
//!
//! Each recorded outcome lives in `<dir>/<signature hash>.json` next to the
//! signature it answers, so an archive directory can be inspected by hand
//! and replayed later by any run issuing the same requests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gleaner_fetch::{Archive, ArchiveError, ArchivedOutcome, RequestSignature};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{ensure_dir, load_json, save_json};

/// One archived request and what the server answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// The request that produced the outcome.
    pub signature: RequestSignature,
    /// The response or error status returned by the server.
    pub outcome: ArchivedOutcome,
    /// When it was recorded.
    pub archived_at: DateTime<Utc>,
}

/// Archive stored as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileArchive {
    dir: PathBuf,
}

impl FileArchive {
    /// Opens the archive at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        ensure_dir(&dir).await?;
        Ok(Self { dir })
    }

    /// Archive directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of archived outcomes.
    pub async fn len(&self) -> Result<usize, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns true when nothing has been archived.
    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    fn entry_path(&self, signature: &RequestSignature) -> PathBuf {
        self.dir.join(format!("{}.json", signature.hashcode()))
    }
}

#[async_trait]
impl Archive for FileArchive {
    async fn record(
        &self,
        signature: &RequestSignature,
        outcome: &ArchivedOutcome,
    ) -> Result<(), ArchiveError> {
        let path = self.entry_path(signature);
        debug!(url = %signature.url, path = %path.display(), "Archiving outcome");

        let entry = ArchiveEntry {
            signature: signature.clone(),
            outcome: outcome.clone(),
            archived_at: Utc::now(),
        };
        save_json(&path, &entry).await?;
        Ok(())
    }

    async fn replay(&self, signature: &RequestSignature) -> Result<ArchivedOutcome, ArchiveError> {
        let path = self.entry_path(signature);

        match load_json::<ArchiveEntry>(&path).await {
            Ok(entry) => Ok(entry.outcome),
            Err(e) if e.is_not_found() => Err(ArchiveError::NoMatchingRecord {
                signature: signature.hashcode(),
                url: signature.url.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
