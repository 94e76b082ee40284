//! Google search hits backend.
//!
//! Fetches the number of results Google reports for a list of keywords.
//! Every fetch produces exactly one item, even when Google reports no hits.

mod backend;
mod client;
pub(crate) mod parser;

use std::time::Duration;

use gleaner_core::Category;

use crate::descriptor::{BackendDescriptor, TransportDefaults};

pub use backend::{GoogleHits, GoogleHitsConfig};
pub use client::GoogleHitsClient;
pub use parser::parse_hits;

/// Google search endpoint, also used as the origin.
pub const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

/// Backend version.
pub const VERSION: &str = "0.3.0";

/// Default base delay between retries.
pub const DEFAULT_SLEEP_TIME: Duration = Duration::from_secs(1);

/// Default retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Statuses retried on top of the transport defaults.
pub const EXTRA_STATUS_FORCELIST: &[u16] = &[429];

/// Returns the googlehits descriptor.
pub fn googlehits_descriptor() -> BackendDescriptor {
    BackendDescriptor {
        cli_name: "googlehits",
        name: "GoogleHits",
        version: VERSION,
        categories: &[Category::Hits],
        has_archiving: true,
        has_resuming: true,
        defaults: TransportDefaults {
            sleep_time: DEFAULT_SLEEP_TIME,
            max_retries: DEFAULT_MAX_RETRIES,
            extra_status_forcelist: EXTRA_STATUS_FORCELIST,
        },
    }
}
