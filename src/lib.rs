//! snyk-pr-closer: bulk-close pull requests opened by the Snyk bot.
//!
//! Scans the open pull requests of a configured set of GitHub repositories,
//! picks out the ones that look like Snyk dependency PRs, writes them to a
//! CSV audit report and, once the user confirms, closes each one with an
//! explanatory comment.

use std::time::Duration;

pub mod cli;
pub mod close;
pub mod config;
pub mod github;
pub mod prompt;
pub mod report;
pub mod scan;
pub mod types;
pub mod workflow;

pub use cli::{CliArgs, parse_args};
pub use close::{close_all, close_pull_request};
pub use config::{ConfigError, load_targets};
pub use github::GitHub;
pub use prompt::{confirm, is_affirmative};
pub use report::{render_csv, write_csv};
pub use scan::{fetch_open_pull_requests, is_snyk_pr, scan_all, scan_repository};
pub use types::{
    CloseResult, CloseSummary, Forge, MatchedPr, PullRequest, PullRequestState, Repo, RepoError,
};
pub use workflow::{Pacing, RunOptions, RunOutcome, run};

/// Blocks the workflow for `duration` before the next remote call.
pub async fn pace(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
