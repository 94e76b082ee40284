//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod googlehits;
pub mod jenkins;
