use std::time::Duration;

use anyhow::Result;
use tracing::error;

use crate::types::{CloseResult, CloseSummary, Forge, MatchedPr, PullRequestState, Repo};

pub const DEFAULT_CLOSE_REASON: &str = "Closing this pull request because Snyk is no longer used \
to manage dependency updates for this repository. Dependency upgrades are handled through \
the regular development process instead.";

async fn close_and_comment<F>(forge: &F, repo: &Repo, number: u64, reason: &str) -> Result<()>
where
    F: Forge + Sync,
{
    forge
        .set_pull_request_state(repo, number, PullRequestState::Closed)
        .await?;
    forge.create_issue_comment(repo, number, reason).await?;
    Ok(())
}

/// Closes one pull request and leaves `reason` as a comment.
///
/// Returns false if either call fails. The comment is only posted after the
/// close succeeds. A pull request that was closed but could not be commented
/// on stays closed.
pub async fn close_pull_request<F>(forge: &F, repo: &Repo, number: u64, reason: &str) -> bool
where
    F: Forge + Sync,
{
    match close_and_comment(forge, repo, number, reason).await {
        Ok(()) => true,
        Err(err) => {
            error!(
                "Failed to close {}/{}#{number}: {err:#}",
                repo.owner(),
                repo.name()
            );
            false
        }
    }
}

/// Closes every match in order, pausing `pause` between pull requests.
///
/// `on_closed` is invoked after each attempt with its result.
pub async fn close_all<F, P>(
    forge: &F,
    matches: &[MatchedPr],
    reason: &str,
    pause: Duration,
    mut on_closed: P,
) -> Result<CloseSummary>
where
    F: Forge + Sync,
    P: FnMut(&CloseResult) -> Result<()>,
{
    let mut summary = CloseSummary::default();

    for (index, matched) in matches.iter().enumerate() {
        if index > 0 {
            crate::pace(pause).await;
        }

        let succeeded = close_pull_request(forge, &matched.repo, matched.pr.number, reason).await;
        let result = CloseResult {
            matched: matched.clone(),
            succeeded,
        };
        on_closed(&result)?;
        summary.results.push(result);
    }

    Ok(summary)
}
