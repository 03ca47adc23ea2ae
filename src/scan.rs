use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error};

use crate::types::{Forge, MatchedPr, PullRequest, Repo};

/// Page size requested from the forge when listing pull requests.
pub const PAGE_SIZE: u8 = 100;

const SNYK_BOT_LOGIN: &str = "snyk-bot";

/// Heuristic check for pull requests raised by the Snyk bot.
///
/// Matches on a case-insensitive "snyk" anywhere in the title or the author
/// login. Humans whose username contains "snyk" are matched too.
pub fn is_snyk_pr(pr: &PullRequest) -> bool {
    let title = pr.title.to_lowercase();
    let author = pr.author_login.to_lowercase();

    title.contains("snyk")
        || title.contains("[snyk]")
        || author == SNYK_BOT_LOGIN
        || author.contains("snyk")
}

/// Pages through every open pull request of `repo`, stopping at the first
/// empty page.
pub async fn fetch_open_pull_requests<F>(forge: &F, repo: &Repo) -> Result<Vec<PullRequest>>
where
    F: Forge + Sync,
{
    let mut all_prs = Vec::new();
    let mut page = 1;

    loop {
        let items = forge.list_open_pull_requests(repo, page, PAGE_SIZE).await?;
        if items.is_empty() {
            break;
        }
        debug!("{repo}: page {page} returned {} PRs", items.len());
        all_prs.extend(items);
        page += 1;
    }

    Ok(all_prs)
}

/// Per-repository result of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoScan {
    pub repo: Repo,
    pub open_count: usize,
    pub matched: Vec<PullRequest>,
    /// Listing failed part way; the counts above are zero.
    pub failed: bool,
}

/// Scans a single repository. A failing repository is logged and reported
/// as failed with no pull requests so the run can continue.
pub async fn scan_repository<F>(forge: &F, repo: &Repo) -> RepoScan
where
    F: Forge + Sync,
{
    let (prs, failed) = match fetch_open_pull_requests(forge, repo).await {
        Ok(prs) => (prs, false),
        Err(err) => {
            error!("Failed to scan {}/{}: {err:#}", repo.owner(), repo.name());
            (Vec::new(), true)
        }
    };

    let open_count = prs.len();
    let matched = prs.into_iter().filter(is_snyk_pr).collect();

    RepoScan {
        repo: repo.clone(),
        open_count,
        matched,
        failed,
    }
}

/// Scans every repository in order, pausing `pause` between repositories.
///
/// `on_scanned` is invoked after each repository so callers can report
/// progress as the scan advances; an error from it aborts the scan.
pub async fn scan_all<F, P>(
    forge: &F,
    repos: &[Repo],
    pause: Duration,
    mut on_scanned: P,
) -> Result<Vec<MatchedPr>>
where
    F: Forge + Sync,
    P: FnMut(&RepoScan) -> Result<()>,
{
    let mut matches = Vec::new();

    for (index, repo) in repos.iter().enumerate() {
        if index > 0 {
            crate::pace(pause).await;
        }

        let scan = scan_repository(forge, repo).await;
        on_scanned(&scan)?;

        matches.extend(scan.matched.into_iter().map(|pr| MatchedPr {
            repo: scan.repo.clone(),
            pr,
        }));
    }

    Ok(matches)
}
