//! Backend registry.
//!
//! Static access to every backend descriptor, looked up by command-line
//! name.

use std::sync::OnceLock;

use gleaner_core::Category;

use crate::descriptor::BackendDescriptor;
use crate::googlehits::googlehits_descriptor;
use crate::jenkins::jenkins_descriptor;

/// Static storage for all backend descriptors.
static DESCRIPTORS: OnceLock<Vec<BackendDescriptor>> = OnceLock::new();

fn init_descriptors() -> Vec<BackendDescriptor> {
    vec![googlehits_descriptor(), jenkins_descriptor()]
}

/// Global registry of backend descriptors.
pub struct BackendRegistry;

impl BackendRegistry {
    /// Returns all backend descriptors.
    pub fn all() -> &'static [BackendDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Looks up a backend by command-line name (case-insensitive).
    pub fn get(cli_name: &str) -> Option<&'static BackendDescriptor> {
        Self::all()
            .iter()
            .find(|d| d.cli_name.eq_ignore_ascii_case(cli_name))
    }

    /// Returns the backends producing `category`.
    pub fn with_category(category: Category) -> Vec<&'static BackendDescriptor> {
        Self::all()
            .iter()
            .filter(|d| d.categories.contains(&category))
            .collect()
    }

    /// Returns the number of registered backends.
    pub fn count() -> usize {
        Self::all().len()
    }
}
