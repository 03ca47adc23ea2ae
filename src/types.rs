use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Reasons a repository identifier can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error("repository owner must not be blank")]
    BlankOwner,
    #[error("repository name must not be blank")]
    BlankName,
}

/// A GitHub repository to scan, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();

        if owner.trim().is_empty() {
            return Err(RepoError::BlankOwner);
        }
        if name.trim().is_empty() {
            return Err(RepoError::BlankName);
        }

        Ok(Self { owner, name })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Snapshot of an open pull request as returned by the forge.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub author_login: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}

/// A pull request that satisfied the Snyk classification, paired with the
/// repository it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPr {
    pub repo: Repo,
    pub pr: PullRequest,
}

/// Outcome of closing a single matched pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseResult {
    pub matched: MatchedPr,
    pub succeeded: bool,
}

/// Ordered results of a close pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloseSummary {
    pub results: Vec<CloseResult>,
}

impl CloseSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Target state for a pull request update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestState {
    Open,
    Closed,
}

impl PullRequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullRequestState::Open => "open",
            PullRequestState::Closed => "closed",
        }
    }
}

/// The remote code-hosting service the workflow talks to.
///
/// Every call is awaited to completion before the next one is issued;
/// implementations need not support overlapping requests.
#[async_trait]
pub trait Forge {
    async fn list_open_pull_requests(
        &self,
        repo: &Repo,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<PullRequest>>;

    async fn set_pull_request_state(
        &self,
        repo: &Repo,
        number: u64,
        state: PullRequestState,
    ) -> Result<()>;

    async fn create_issue_comment(&self, repo: &Repo, number: u64, body: &str) -> Result<()>;
}
