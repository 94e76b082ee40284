//! Backends command - list available backends.

use anyhow::Result;
use gleaner_backends::BackendRegistry;
use serde::Serialize;

/// Arguments for the backends command.
#[derive(clap::Args, Debug, Default)]
pub struct BackendsArgs {
    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct BackendOutput {
    name: &'static str,
    backend: &'static str,
    version: &'static str,
    categories: Vec<&'static str>,
    archiving: bool,
    resuming: bool,
    sleep_time_secs: u64,
    max_retries: u32,
}

/// Runs the backends command.
pub fn run(args: &BackendsArgs) -> Result<()> {
    let backends = BackendRegistry::all();

    if args.json {
        let output: Vec<BackendOutput> = backends
            .iter()
            .map(|d| BackendOutput {
                name: d.cli_name,
                backend: d.name,
                version: d.version,
                categories: d.categories.iter().map(|c| c.as_str()).collect(),
                archiving: d.has_archiving,
                resuming: d.has_resuming,
                sleep_time_secs: d.defaults.sleep_time.as_secs(),
                max_retries: d.defaults.max_retries,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for descriptor in backends {
            println!("{descriptor}");
        }
        println!();
        println!("Total: {} backends", backends.len());
    }

    Ok(())
}
