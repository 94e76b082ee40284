//! Jenkins command.

use anyhow::{Context, Result};
use gleaner_backends::jenkins::DEFAULT_DETAIL_DEPTH;
use gleaner_backends::{BackendRegistry, Jenkins, JenkinsConfig};
use gleaner_fetch::Connector;
use gleaner_store::Settings;

use super::common::{run_fetch, FetchArgs, RetryArgs};

/// Arguments for the jenkins command.
#[derive(clap::Args, Debug)]
pub struct JenkinsArgs {
    /// URL of the Jenkins server.
    pub url: String,

    /// Jenkins user.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Jenkins API token.
    #[arg(short = 't', long)]
    pub api_token: Option<String>,

    /// Detail level of the build listings.
    #[arg(long, default_value_t = DEFAULT_DETAIL_DEPTH)]
    pub detail_depth: u32,

    /// Jobs not fetched.
    #[arg(long, num_args = 1.., value_name = "JOB")]
    pub blacklist_ids: Vec<String>,

    #[command(flatten)]
    pub retry: RetryArgs,

    #[command(flatten)]
    pub fetch: FetchArgs,
}

impl JenkinsArgs {
    fn config(&self, max_retries: u32, sleep_time: std::time::Duration) -> JenkinsConfig {
        let mut config = JenkinsConfig::new(self.url.clone());
        config.user.clone_from(&self.user);
        config.api_token.clone_from(&self.api_token);
        config.detail_depth = self.detail_depth;
        config.max_retries = max_retries;
        config.sleep_time = sleep_time;
        config.blacklist_ids.clone_from(&self.blacklist_ids);
        config
    }
}

/// Runs the jenkins command.
pub async fn run(args: &JenkinsArgs, settings: &Settings) -> Result<()> {
    let descriptor = BackendRegistry::get("jenkins").context("jenkins backend not registered")?;

    let config = args.config(
        args.retry.max_retries(descriptor),
        args.retry.sleep_time(descriptor),
    );
    let backend = Jenkins::new(config)?;

    let summary = run_fetch(Connector::new(Box::new(backend)), descriptor, &args.fetch, settings).await?;
    if summary.skipped > 0 {
        tracing::warn!(skipped = summary.skipped, "Some jobs were skipped");
    }
    Ok(())
}
