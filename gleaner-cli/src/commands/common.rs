//! Arguments and run loop shared by every backend command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::TryStreamExt;
use gleaner_backends::BackendDescriptor;
use gleaner_core::{Category, FetchSummary};
use gleaner_fetch::Connector;
use gleaner_store::{FileArchive, Settings};
use tracing::info;

// ============================================================================
// Arguments
// ============================================================================

/// Retry arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RetryArgs {
    /// Number of retries after a failed request [default depends on backend].
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Seconds to wait between retries [default depends on backend].
    #[arg(long)]
    pub sleep_time: Option<u64>,
}

impl RetryArgs {
    /// Resolved retry budget.
    pub fn max_retries(&self, descriptor: &BackendDescriptor) -> u32 {
        self.max_retries.unwrap_or(descriptor.defaults.max_retries)
    }

    /// Resolved base delay.
    pub fn sleep_time(&self, descriptor: &BackendDescriptor) -> Duration {
        self.sleep_time
            .map_or(descriptor.defaults.sleep_time, Duration::from_secs)
    }
}

/// Arguments controlling a fetch run and its output.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Category of items to fetch [default: the backend's first category].
    #[arg(long)]
    pub category: Option<String>,

    /// Tag stamped on items [default: the origin].
    #[arg(long)]
    pub tag: Option<String>,

    /// Directory of the response archive.
    #[arg(long, value_name = "DIR")]
    pub archive_path: Option<PathBuf>,

    /// Do not record responses.
    #[arg(long, conflicts_with = "fetch_archive")]
    pub no_archive: bool,

    /// Replay responses from the archive instead of the network.
    #[arg(long)]
    pub fetch_archive: bool,

    /// Print one JSON item per line.
    #[arg(long)]
    pub json_line: bool,
}

impl FetchArgs {
    /// Resolved category.
    pub fn category(&self, descriptor: &BackendDescriptor) -> Result<Category> {
        match &self.category {
            Some(name) => Ok(name.parse::<Category>()?),
            None => descriptor
                .default_category()
                .with_context(|| format!("{} declares no category", descriptor.name)),
        }
    }
}

// ============================================================================
// Run Loop
// ============================================================================

/// Runs a connector and prints its items to stdout.
pub async fn run_fetch(
    mut connector: Connector,
    descriptor: &BackendDescriptor,
    args: &FetchArgs,
    settings: &Settings,
) -> Result<FetchSummary> {
    let category = args.category(descriptor)?;

    if let Some(tag) = &args.tag {
        connector = connector.with_tag(tag.clone());
    }

    if !args.no_archive && descriptor.has_archiving {
        let dir = args
            .archive_path
            .clone()
            .unwrap_or_else(|| settings.archive_dir());
        let archive = FileArchive::open(&dir)
            .await
            .with_context(|| format!("Failed to open archive at {}", dir.display()))?;
        connector = connector.with_archive(Arc::new(archive));
    }

    let json_lines = args.json_line || settings.json_lines;
    let mut stream = if args.fetch_archive {
        connector.fetch_from_archive(category)?
    } else {
        connector.fetch(category)?
    };

    let mut out = std::io::stdout();
    while let Some(item) = stream.try_next().await? {
        let json = if json_lines {
            serde_json::to_string(&item)?
        } else {
            serde_json::to_string_pretty(&item)?
        };
        writeln!(out, "{json}")?;
    }
    drop(stream);
    out.flush()?;

    let summary = connector.summary().clone();
    info!(
        backend = descriptor.name,
        fetched = summary.fetched,
        skipped = summary.skipped,
        last_uuid = summary.last_uuid.as_deref().unwrap_or("-"),
        "Fetch finished"
    );
    Ok(summary)
}
