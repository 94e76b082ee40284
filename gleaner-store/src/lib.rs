// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Gleaner Store
//!
//! Everything gleaner keeps on disk.
//!
//! - **`FileArchive`**: recorded outcomes, one JSON file per request
//!   signature, replayable with no network access
//! - **Settings**: user defaults loaded from the config directory
//! - **Persistence**: JSON file helpers with owner-only permissions
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use gleaner_store::{FileArchive, Settings};
//!
//! let settings = Settings::load().await;
//! let archive = FileArchive::open(settings.archive_dir()).await?;
//! let connector = connector.with_archive(Arc::new(archive));
//! ```

pub mod archive;
pub mod error;
pub mod persistence;
pub mod settings;

pub use archive::{ArchiveEntry, FileArchive};
pub use error::StoreError;
pub use persistence::{
    default_archive_dir, default_cache_dir, default_config_dir, default_settings_path, ensure_dir,
    load_json, load_json_or_default, save_json,
};
pub use settings::{LogLevel, Settings};
