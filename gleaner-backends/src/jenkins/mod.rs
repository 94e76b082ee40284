//! Jenkins backend.
//!
//! Lists the jobs of a Jenkins server and yields the builds of each job.
//! A job whose builds cannot be fetched (HTTP 500), or whose payload is
//! empty or unparsable, is skipped without aborting the run.

mod backend;
mod client;

use std::time::Duration;

use gleaner_core::Category;

use crate::descriptor::{BackendDescriptor, TransportDefaults};

pub use backend::{Jenkins, JenkinsConfig};
pub use client::JenkinsClient;

/// Backend version.
pub const VERSION: &str = "0.14.1";

/// Default base delay between retries.
pub const DEFAULT_SLEEP_TIME: Duration = Duration::from_secs(10);

/// Default retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default `depth` of build listings.
pub const DEFAULT_DETAIL_DEPTH: u32 = 1;

/// Statuses retried on top of the transport defaults.
pub const EXTRA_STATUS_FORCELIST: &[u16] = &[410, 502, 503];

/// Returns the jenkins descriptor.
pub fn jenkins_descriptor() -> BackendDescriptor {
    BackendDescriptor {
        cli_name: "jenkins",
        name: "Jenkins",
        version: VERSION,
        categories: &[Category::Build],
        has_archiving: true,
        has_resuming: false,
        defaults: TransportDefaults {
            sleep_time: DEFAULT_SLEEP_TIME,
            max_retries: DEFAULT_MAX_RETRIES,
            extra_status_forcelist: EXTRA_STATUS_FORCELIST,
        },
    }
}
