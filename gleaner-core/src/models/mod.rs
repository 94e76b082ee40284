//! Domain models.
//!
//! - [`Category`] - item categories
//! - [`Credentials`] - validated auth pair
//! - [`Item`] - the stamped item envelope
//! - [`FetchSummary`] - per-run counters

mod category;
mod credentials;
mod item;
mod summary;

pub use category::Category;
pub use credentials::Credentials;
pub use item::{unix_timestamp, Item, SearchFields};
pub use summary::FetchSummary;
