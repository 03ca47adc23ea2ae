//! The end-to-end run: scan, report, confirm, close.
//!
//! Stages advance strictly forward. The report is always on disk before the
//! confirmation prompt, so the pull requests acted upon are exactly those the
//! user was shown.

use std::{io::Write, path::PathBuf, time::Duration};

use anyhow::Result;
use tokio::io::AsyncBufRead;
use tracing::info;

use crate::{
    close::{DEFAULT_CLOSE_REASON, close_all},
    prompt::confirm,
    report::{DEFAULT_REPORT_PATH, write_csv},
    scan::scan_all,
    types::{CloseSummary, Forge, MatchedPr, Repo},
};

/// Fixed pauses between consecutive remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub between_repositories: Duration,
    pub between_closures: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_repositories: Duration::from_millis(500),
            between_closures: Duration::from_millis(1000),
        }
    }
}

impl Pacing {
    /// No pauses at all, for tests and offline runs.
    pub const fn none() -> Self {
        Self {
            between_repositories: Duration::ZERO,
            between_closures: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub report_path: PathBuf,
    pub reason: String,
    pub pacing: Pacing,
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            reason: DEFAULT_CLOSE_REASON.to_string(),
            pacing: Pacing::default(),
            dry_run: false,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No repository had a matching pull request; nothing was written.
    NoMatches,
    /// The report was written and closing was skipped on request.
    DryRun { report: PathBuf },
    /// The report was written and the user declined to close.
    Declined { report: PathBuf },
    /// Every match was attempted.
    Completed {
        report: PathBuf,
        summary: CloseSummary,
    },
}

fn write_summary<W: Write>(matches: &[MatchedPr], output: &mut W) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "Found {} Snyk PR(s):", matches.len())?;

    let mut current: Option<&Repo> = None;
    for matched in matches {
        if current != Some(&matched.repo) {
            writeln!(output)?;
            writeln!(output, "{}", matched.repo)?;
            current = Some(&matched.repo);
        }
        writeln!(
            output,
            "  #{} {} ({})",
            matched.pr.number, matched.pr.title, matched.pr.author_login
        )?;
    }
    writeln!(output)?;

    Ok(())
}

/// Runs the whole workflow against `forge` for the given targets.
///
/// `input` supplies the answer to the confirmation prompt and `output`
/// receives all user-facing progress.
pub async fn run<F, R, W>(
    forge: &F,
    targets: &[Repo],
    options: &RunOptions,
    input: &mut R,
    output: &mut W,
) -> Result<RunOutcome>
where
    F: Forge + Sync,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(output, "Scanning {} repositories...", targets.len())?;

    let matches = scan_all(
        forge,
        targets,
        options.pacing.between_repositories,
        |scan| {
            if scan.failed {
                writeln!(output, "{}: scan failed, skipping", scan.repo)?;
            } else {
                writeln!(
                    output,
                    "{}: {} open PR(s), {} Snyk PR(s)",
                    scan.repo,
                    scan.open_count,
                    scan.matched.len()
                )?;
            }
            Ok(())
        },
    )
    .await?;

    if matches.is_empty() {
        writeln!(output, "No Snyk PRs found.")?;
        return Ok(RunOutcome::NoMatches);
    }

    write_summary(&matches, output)?;

    let report = options.report_path.clone();
    write_csv(&report, &matches)?;
    writeln!(output, "Report written to {}", report.display())?;
    info!("Wrote {} matches to {}", matches.len(), report.display());

    if options.dry_run {
        writeln!(output, "Dry run: no pull requests were closed.")?;
        return Ok(RunOutcome::DryRun { report });
    }

    let question = format!("Close {} Snyk PR(s)?", matches.len());
    if !confirm(input, output, &question).await? {
        writeln!(output, "Aborted: no pull requests were closed.")?;
        return Ok(RunOutcome::Declined { report });
    }

    let summary = close_all(
        forge,
        &matches,
        &options.reason,
        options.pacing.between_closures,
        |result| {
            let status = if result.succeeded { "closed" } else { "FAILED" };
            writeln!(
                output,
                "{status}: {}#{}",
                result.matched.repo, result.matched.pr.number
            )?;
            Ok(())
        },
    )
    .await?;

    writeln!(output)?;
    writeln!(
        output,
        "Closed {} PR(s), {} failed.",
        summary.succeeded(),
        summary.failed()
    )?;

    Ok(RunOutcome::Completed { report, summary })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::PullRequest;

    fn matched(owner: &str, name: &str, number: u64) -> MatchedPr {
        MatchedPr {
            repo: Repo::new(owner, name).unwrap(),
            pr: PullRequest {
                number,
                title: format!("[Snyk] Upgrade dep {number}"),
                author_login: "snyk-bot".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                url: format!("https://github.com/{owner}/{name}/pull/{number}"),
            },
        }
    }

    #[test]
    fn test_default_pacing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.between_repositories, Duration::from_millis(500));
        assert_eq!(pacing.between_closures, Duration::from_millis(1000));
    }

    #[test]
    fn test_summary_groups_by_repository() {
        let matches = vec![
            matched("acme", "alpha", 1),
            matched("acme", "alpha", 4),
            matched("acme", "beta", 2),
        ];
        let mut output = Vec::new();

        write_summary(&matches, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Found 3 Snyk PR(s):"));
        assert_eq!(text.matches("acme/alpha\n").count(), 1);
        assert_eq!(text.matches("acme/beta\n").count(), 1);
        assert!(text.contains("  #4 [Snyk] Upgrade dep 4 (snyk-bot)"));

        let alpha = text.find("acme/alpha").unwrap();
        let beta = text.find("acme/beta").unwrap();
        assert!(alpha < beta);
    }
}
