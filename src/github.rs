use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::{Octocrab, models::IssueState};
use tracing::debug;

use crate::types::{Forge, PullRequest, PullRequestState, Repo};

/// Resolves a GitHub token from the environment, falling back to the gh CLI.
pub fn get_github_token() -> Result<String> {
    if let Ok(token) = std::env::var("GITHUB_TOKEN")
        && !token.trim().is_empty()
    {
        return Ok(token);
    }

    if let Ok(token) = std::env::var("GH_TOKEN")
        && !token.trim().is_empty()
    {
        return Ok(token);
    }

    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .context("GITHUB_TOKEN is not set and the gh CLI could not be run")?;

    if !output.status.success() {
        anyhow::bail!(
            "GITHUB_TOKEN is not set and 'gh auth token' failed. Set GITHUB_TOKEN or run 'gh auth login'"
        );
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// Forge implementation backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHub {
    octocrab: Octocrab,
}

impl GitHub {
    pub fn new(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Builds an authenticated client from the available credentials.
    pub fn from_env() -> Result<Self> {
        let token = get_github_token().context("Failed to obtain GitHub authentication token")?;
        let octocrab = Octocrab::builder()
            .personal_token(token)
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self::new(octocrab))
    }
}

fn convert_pull_request(pr: octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        author_login: pr.user.map(|u| u.login).unwrap_or_default(),
        created_at: pr.created_at.unwrap_or_default(),
        updated_at: pr.updated_at.unwrap_or_default(),
        url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn list_open_pull_requests(
        &self,
        repo: &Repo,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<PullRequest>> {
        debug!("Fetching open PRs for {repo}, page {page}");

        let page = self
            .octocrab
            .pulls(repo.owner(), repo.name())
            .list()
            .state(octocrab::params::State::Open)
            .per_page(per_page)
            .page(page)
            .send()
            .await
            .with_context(|| format!("Failed to list pull requests for {repo}"))?;

        Ok(page.items.into_iter().map(convert_pull_request).collect())
    }

    async fn set_pull_request_state(
        &self,
        repo: &Repo,
        number: u64,
        state: PullRequestState,
    ) -> Result<()> {
        debug!("Setting {repo}#{number} to {}", state.as_str());

        let issue_state = match state {
            PullRequestState::Open => IssueState::Open,
            PullRequestState::Closed => IssueState::Closed,
        };

        // Pull requests share their number with the backing issue, and the
        // issues endpoint accepts the state change for both.
        self.octocrab
            .issues(repo.owner(), repo.name())
            .update(number)
            .state(issue_state)
            .send()
            .await
            .with_context(|| format!("Failed to set {repo}#{number} {}", state.as_str()))?;

        Ok(())
    }

    async fn create_issue_comment(&self, repo: &Repo, number: u64, body: &str) -> Result<()> {
        debug!("Commenting on {repo}#{number}");

        self.octocrab
            .issues(repo.owner(), repo.name())
            .create_comment(number, body)
            .await
            .with_context(|| format!("Failed to comment on {repo}#{number}"))?;

        Ok(())
    }
}
