// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Gleaner Backends
//!
//! Concrete data sources behind the [`gleaner_fetch::Backend`] contract.
//!
//! - [`googlehits`] - number of Google search results for a keyword list
//!   (flat: one item per fetch)
//! - [`jenkins`] - builds of every job on a Jenkins server (hierarchical:
//!   jobs, then builds per job)
//!
//! [`BackendRegistry`] exposes a static [`BackendDescriptor`] per backend.

pub mod descriptor;
pub mod googlehits;
pub mod jenkins;
pub mod registry;

pub use descriptor::BackendDescriptor;
pub use googlehits::{GoogleHits, GoogleHitsClient, GoogleHitsConfig};
pub use jenkins::{Jenkins, JenkinsClient, JenkinsConfig};
pub use registry::BackendRegistry;
