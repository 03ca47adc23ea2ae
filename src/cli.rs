use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;

use crate::{
    close::DEFAULT_CLOSE_REASON,
    config::DEFAULT_CONFIG_PATH,
    report::DEFAULT_REPORT_PATH,
    workflow::{Pacing, RunOptions},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Parser, Debug)]
#[command(
    name = "snyk-pr-closer",
    about = "Find open Snyk pull requests across your repositories, write a CSV report, and close them after confirmation"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
pub struct CliArgs {
    /// JSON file mapping project names to their GitHub owner and repository
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Where to write the CSV report (overwritten on every run)
    #[arg(short = 'o', long, value_name = "PATH", default_value = DEFAULT_REPORT_PATH)]
    pub output: PathBuf,

    /// Comment posted on each closed PR
    #[arg(long, value_name = "TEXT", default_value = DEFAULT_CLOSE_REASON, hide_default_value = true)]
    pub reason: String,

    /// Pause between repository scans, in milliseconds
    #[arg(long = "repo-delay-ms", value_name = "MS", default_value_t = 500)]
    pub repo_delay_ms: u64,

    /// Pause between PR closures, in milliseconds
    #[arg(long = "close-delay-ms", value_name = "MS", default_value_t = 1000)]
    pub close_delay_ms: u64,

    /// Write the report but do not prompt or close anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn validate(&self) -> Result<()> {
        if self.reason.trim().is_empty() {
            anyhow::bail!("--reason must not be empty");
        }
        Ok(())
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            report_path: self.output.clone(),
            reason: self.reason.clone(),
            pacing: Pacing {
                between_repositories: Duration::from_millis(self.repo_delay_ms),
                between_closures: Duration::from_millis(self.close_delay_ms),
            },
            dry_run: self.dry_run,
        }
    }
}

/// Parses and validates command-line arguments.
pub fn parse_args<I, T>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    cli.validate()?;
    Ok(cli)
}
