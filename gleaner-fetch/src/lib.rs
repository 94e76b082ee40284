// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Gleaner Fetch
//!
//! Transport and fetch orchestration shared by every gleaner backend.
//!
//! ## Transport
//!
//! - [`HttpClient`] - GET requests with a retry budget on a configurable
//!   status set, plus archive record/replay
//! - [`RetryPolicy`] - retry budget and backoff growth
//! - [`Archive`] - the record/replay collaborator, with [`MemoryArchive`]
//!   as an in-process implementation
//!
//! ## Orchestration
//!
//! - [`Backend`] - the contract every source implements
//! - [`Connector`] - runs a backend, stamps items and keeps the run summary
//!
//! ## Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use gleaner_core::Category;
//! use gleaner_fetch::Connector;
//!
//! let mut connector = Connector::new(Box::new(backend));
//! let items: Vec<_> = connector.fetch(Category::Build)?.try_collect().await?;
//! println!("{} skipped", connector.summary().skipped);
//! ```

pub mod archive;
pub mod backend;
pub mod client;
pub mod connector;
pub mod error;
pub mod retry;

pub use archive::{Archive, ArchiveMode, ArchivedOutcome, MemoryArchive, RequestSignature};
pub use backend::{Backend, Harvest, HarvestStream};
pub use client::{HttpClient, HttpClientBuilder, RawResponse, DEFAULT_STATUS_FORCELIST, USER_AGENT};
pub use connector::{Connector, ItemStream};
pub use error::{ArchiveError, FetchError};
pub use retry::{Backoff, RetryPolicy};
