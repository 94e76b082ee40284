//! Googlehits command.

use anyhow::{Context, Result};
use gleaner_backends::{BackendRegistry, GoogleHits, GoogleHitsConfig};
use gleaner_fetch::Connector;
use gleaner_store::Settings;

use super::common::{run_fetch, FetchArgs, RetryArgs};

/// Arguments for the googlehits command.
#[derive(clap::Args, Debug)]
pub struct GoogleHitsArgs {
    /// Keywords searched together.
    #[arg(required = true, num_args = 1..)]
    pub keywords: Vec<String>,

    #[command(flatten)]
    pub retry: RetryArgs,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

/// Runs the googlehits command.
pub async fn run(args: &GoogleHitsArgs, settings: &Settings) -> Result<()> {
    let descriptor = BackendRegistry::get("googlehits").context("googlehits backend not registered")?;

    let mut config = GoogleHitsConfig::new(args.keywords.iter().cloned());
    config.max_retries = args.retry.max_retries(descriptor);
    config.sleep_time = args.retry.sleep_time(descriptor);

    let backend = GoogleHits::new(config)?;
    run_fetch(Connector::new(Box::new(backend)), descriptor, &args.fetch, settings).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_parse_keywords() {
        let cli = Cli::try_parse_from([
            "gleaner",
            "googlehits",
            "rust",
            "programming",
            "--max-retries",
            "2",
            "--category",
            "hits",
        ])
        .unwrap();

        let Commands::Googlehits(args) = cli.command else {
            panic!("expected googlehits command");
        };
        assert_eq!(args.keywords, ["rust", "programming"]);
        assert_eq!(args.retry.max_retries, Some(2));
        assert_eq!(args.fetch.category.as_deref(), Some("hits"));
    }

    #[test]
    fn test_keywords_required() {
        assert!(Cli::try_parse_from(["gleaner", "googlehits"]).is_err());
    }
}
