//! Backend descriptor system.
//!
//! A descriptor holds the static facts about a backend: its names, version,
//! categories, capability flags and the defaults its transport runs with.

use std::fmt;
use std::time::Duration;

use gleaner_core::Category;

// ============================================================================
// Backend Descriptor
// ============================================================================

/// Static description of a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    /// Command-line name, e.g. `jenkins`.
    pub cli_name: &'static str,
    /// Name stamped on items, e.g. `Jenkins`.
    pub name: &'static str,
    /// Backend version.
    pub version: &'static str,
    /// Categories the backend produces.
    pub categories: &'static [Category],
    /// Whether runs can be archived and replayed.
    pub has_archiving: bool,
    /// Whether interrupted runs can be resumed.
    pub has_resuming: bool,
    /// Transport defaults.
    pub defaults: TransportDefaults,
}

impl BackendDescriptor {
    /// The category fetched when none is given.
    pub fn default_category(&self) -> Option<Category> {
        self.categories.first().copied()
    }
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let categories: Vec<&str> = self.categories.iter().map(|c| c.as_str()).collect();
        write!(
            f,
            "{:<12} {:<8} categories={} archiving={} resuming={}",
            self.cli_name,
            self.version,
            categories.join(","),
            self.has_archiving,
            self.has_resuming
        )
    }
}

// ============================================================================
// Transport Defaults
// ============================================================================

/// Default transport settings of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportDefaults {
    /// Base delay between retries.
    pub sleep_time: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Statuses retried on top of the transport defaults.
    pub extra_status_forcelist: &'static [u16],
}
