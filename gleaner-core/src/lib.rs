// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Gleaner Core
//!
//! Core types shared by every gleaner crate.
//!
//! - [`Item`] - the envelope every backend emits, stamped with identity,
//!   update time and category
//! - [`Category`] - labels partitioning what a backend can produce
//! - [`Credentials`] - a validated user/token pair
//! - [`FetchSummary`] - per-run counters
//! - [`uuid`] - deterministic identifiers built from string parts
//! - [`CoreError`] - construction and data errors

pub mod error;
pub mod identity;
pub mod models;

pub use error::CoreError;
pub use identity::uuid;
pub use models::{
    unix_timestamp, Category, Credentials, FetchSummary, Item, SearchFields,
};
