//! Remote collaborators consumed by the synchronizer.
//!
//! [`ContentStore`] covers the content-addressed object store (blob, tree,
//! commit, ref) plus the pull request calls. [`CommitSource`] yields the
//! commits to release and [`Notifier`] posts human-readable comments.
//! [`GitHubStore`] implements all three over the GitHub REST API;
//! [`MemoryStore`] implements them in process.

mod error;
mod github;
mod memory;

pub use error::StoreError;
pub use github::GitHubStore;
pub use memory::{MemoryStore, Operation};

use crate::metadata::extract_version;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A commit as seen by the version engine. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub date: String,
}

impl Commit {
    /// Creates a commit with only a sha and message.
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            author: String::new(),
            date: String::new(),
        }
    }

    /// Sets the author and date.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>, date: impl Into<String>) -> Self {
        self.author = author.into();
        self.date = date.into();
        self
    }

    /// Returns the first seven characters of the sha.
    #[must_use]
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// An open pull request. Referenced, not owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub branch: String,
    pub body: String,
}

/// One path replaced in a new tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub blob_sha: String,
}

/// Object store and pull request operations.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolves a branch name to its commit sha.
    ///
    /// Fails with [`StoreError::RefNotFound`] if the branch does not exist.
    async fn resolve_ref(&self, branch: &str) -> Result<String, StoreError>;

    /// Returns the tree sha of a commit.
    async fn commit_tree(&self, commit_sha: &str) -> Result<String, StoreError>;

    /// Reads a file at a branch or sha. Missing files yield `None`.
    async fn read_file(&self, path: &str, reference: &str) -> Result<Option<String>, StoreError>;

    async fn create_blob(&self, content: &str) -> Result<String, StoreError>;

    /// Creates a tree that inherits `base_tree` and replaces `entries`.
    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String, StoreError>;

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, StoreError>;

    /// Points `branch` at `sha`, creating the branch if needed.
    ///
    /// Without `force`, the update must be a fast-forward.
    async fn update_ref(&self, branch: &str, sha: &str, force: bool) -> Result<(), StoreError>;

    async fn find_open_pull_request(&self, head_branch: &str)
        -> Result<Option<PullRequest>, StoreError>;

    async fn create_pull_request(
        &self,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<PullRequest, StoreError>;

    async fn update_pull_request(&self, number: u64, title: &str, body: &str)
        -> Result<(), StoreError>;
}

/// Supplies the commits made since the last release.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Lists commits on `branch` after `since`, oldest first.
    ///
    /// Without a `since` anchor the walk stops at the most recent release
    /// commit.
    async fn commits_since(&self, branch: &str, since: Option<&str>) -> Result<Vec<Commit>, StoreError>;
}

/// Posts text to a pull request thread.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, pr_number: u64, text: &str) -> Result<(), StoreError>;
}

/// Cuts a newest-first history at the anchor sha or the latest release
/// commit, whichever comes first, and returns the rest oldest first.
pub(crate) fn commits_after_release(newest_first: Vec<Commit>, since: Option<&str>) -> Vec<Commit> {
    let mut commits: Vec<Commit> = newest_first
        .into_iter()
        .take_while(|commit| Some(commit.sha.as_str()) != since && extract_version(&commit.message).is_none())
        .collect();
    commits.reverse();
    commits
}
