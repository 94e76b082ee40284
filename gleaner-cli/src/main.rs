// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! gleaner CLI - harvest items from a data source.
//!
//! # Examples
//!
//! ```bash
//! # Number of Google results for a query
//! gleaner googlehits rust programming
//!
//! # Every build of every job, one JSON item per line
//! gleaner jenkins https://ci.example.org --json-line
//!
//! # Authenticated, skipping a job
//! gleaner jenkins https://ci.example.org -u admin -t TOKEN --blacklist-ids nightly
//!
//! # Replay the last recorded run
//! gleaner jenkins https://ci.example.org --fetch-archive
//!
//! # List backends
//! gleaner backends
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gleaner_core::CoreError;
use gleaner_fetch::FetchError;
use gleaner_store::{LogLevel, Settings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{backends, googlehits, jenkins};

// ============================================================================
// CLI Definition
// ============================================================================

/// gleaner - pluggable data harvesting.
#[derive(Parser)]
#[command(name = "gleaner")]
#[command(about = "Harvest items from Google search hits or Jenkins servers")]
#[command(version)]
#[command(author = "Gleaner Contributors")]
pub struct Cli {
    /// Backend to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (no logging, no error output).
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the number of Google results for a keyword list.
    Googlehits(googlehits::GoogleHitsArgs),

    /// Fetch the builds of every job on a Jenkins server.
    Jenkins(jenkins::JenkinsArgs),

    /// List available backends.
    Backends(backends::BackendsArgs),
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success, possibly with skipped branches.
    Success = 0,
    /// A fatal fetch error.
    Error = 1,
    /// Invalid arguments or configuration.
    Config = 2,
}

impl ExitCode {
    /// Classifies a command failure.
    fn for_error(error: &anyhow::Error) -> Self {
        let is_config = error
            .downcast_ref::<FetchError>()
            .is_some_and(FetchError::is_config)
            || error
                .downcast_ref::<CoreError>()
                .is_some_and(CoreError::is_config);

        if is_config {
            ExitCode::Config
        } else {
            ExitCode::Error
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, default_level: LogLevel) {
    if quiet {
        return;
    }

    let level = if verbose { LogLevel::Debug } else { default_level };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(format!("gleaner={level}")))
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().await;

    setup_logging(cli.verbose, cli.quiet, settings.log_level);

    let result = match &cli.command {
        Commands::Googlehits(args) => googlehits::run(args, &settings).await,
        Commands::Jenkins(args) => jenkins::run(args, &settings).await,
        Commands::Backends(args) => backends::run(args),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}
