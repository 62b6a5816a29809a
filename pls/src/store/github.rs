//! [`ContentStore`] over the GitHub REST API.

use super::{commits_after_release, Commit, CommitSource, ContentStore, Notifier, PullRequest, StoreError, TreeEntry};
use crate::rate_limit::guard_core_budget;
use async_trait::async_trait;
use octocrab::params::State;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pages of history scanned when no release anchor is found sooner.
const MAX_HISTORY_PAGES: u32 = 10;

/// Commits requested per history page.
const HISTORY_PAGE_SIZE: u8 = 100;

/// GitHub-backed store for one repository.
#[derive(Debug, Clone)]
pub struct GitHubStore {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

#[derive(Debug, Deserialize)]
struct ShaObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: ShaObject,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    tree: ShaObject,
}

#[derive(Debug, Serialize)]
struct NewBlob<'a> {
    content: &'a str,
    encoding: &'static str,
}

#[derive(Debug, Serialize)]
struct NewTreeEntry<'a> {
    path: &'a str,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct NewTree<'a> {
    base_tree: &'a str,
    tree: Vec<NewTreeEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct NewCommit<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
}

#[derive(Debug, Serialize)]
struct NewRef<'a> {
    #[serde(rename = "ref")]
    reference: String,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct RefUpdate<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Debug, Serialize)]
struct HistoryQuery<'a> {
    sha: &'a str,
    per_page: u8,
    page: u32,
}

#[derive(Debug, Deserialize)]
struct HistoryCommit {
    sha: String,
    commit: HistoryCommitDetail,
}

#[derive(Debug, Deserialize)]
struct HistoryCommitDetail {
    message: String,
    author: Option<HistoryAuthor>,
}

#[derive(Debug, Deserialize)]
struct HistoryAuthor {
    name: Option<String>,
    date: Option<String>,
}

impl GitHubStore {
    /// Creates a store authenticated with a personal access token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Remote`] if the client cannot be built.
    pub fn new(token: &str, owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, StoreError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| remote_error("build client", e))?;
        Ok(Self::from_client(octocrab, owner, repo))
    }

    /// Wraps an existing client.
    pub fn from_client(octocrab: Octocrab, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            octocrab,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    fn route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}/{suffix}", self.owner, self.repo)
    }

    async fn guard(&self, operation: &str) -> Result<(), StoreError> {
        guard_core_budget(&self.octocrab)
            .await
            .map_err(|e| remote_error(operation, e))
    }

    fn pull_request(&self, pr: octocrab::models::pulls::PullRequest) -> PullRequest {
        let url = pr.html_url.as_ref().map_or_else(
            || format!("https://github.com/{}/{}/pull/{}", self.owner, self.repo, pr.number),
            |u| u.to_string(),
        );
        PullRequest {
            number: pr.number,
            url,
            title: pr.title.unwrap_or_default(),
            branch: pr.head.ref_field.clone(),
            body: pr.body.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn resolve_ref(&self, branch: &str) -> Result<String, StoreError> {
        let route = self.route(&format!("git/ref/heads/{branch}"));
        match self.octocrab.get::<GitRef, _, ()>(route, None).await {
            Ok(reference) => Ok(reference.object.sha),
            Err(e) if is_not_found(&e) => Err(StoreError::ref_not_found(format!("heads/{branch}"))),
            Err(e) => Err(remote_error("resolve ref", e)),
        }
    }

    async fn commit_tree(&self, commit_sha: &str) -> Result<String, StoreError> {
        let route = self.route(&format!("git/commits/{commit_sha}"));
        let commit: GitCommit = self
            .octocrab
            .get::<GitCommit, _, ()>(route, None)
            .await
            .map_err(|e| remote_error("read commit", e))?;
        Ok(commit.tree.sha)
    }

    async fn read_file(&self, path: &str, reference: &str) -> Result<Option<String>, StoreError> {
        let result = self
            .octocrab
            .repos(&self.owner, &self.repo)
            .get_content()
            .path(path)
            .r#ref(reference)
            .send()
            .await;

        match result {
            Ok(contents) => Ok(contents.items.into_iter().next().and_then(|c| c.decoded_content())),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(remote_error("read file", e)),
        }
    }

    async fn create_blob(&self, content: &str) -> Result<String, StoreError> {
        self.guard("create blob").await?;
        let blob: ShaObject = self
            .octocrab
            .post(
                self.route("git/blobs"),
                Some(&NewBlob {
                    content,
                    encoding: "utf-8",
                }),
            )
            .await
            .map_err(|e| remote_error("create blob", e))?;
        debug!(sha = %blob.sha, "Created blob");
        Ok(blob.sha)
    }

    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String, StoreError> {
        let body = NewTree {
            base_tree,
            tree: entries
                .iter()
                .map(|entry| NewTreeEntry {
                    path: &entry.path,
                    mode: "100644",
                    kind: "blob",
                    sha: &entry.blob_sha,
                })
                .collect(),
        };
        let tree: ShaObject = self
            .octocrab
            .post(self.route("git/trees"), Some(&body))
            .await
            .map_err(|e| remote_error("create tree", e))?;
        debug!(sha = %tree.sha, base_tree, "Created tree");
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, StoreError> {
        let commit: ShaObject = self
            .octocrab
            .post(
                self.route("git/commits"),
                Some(&NewCommit {
                    message,
                    tree,
                    parents,
                }),
            )
            .await
            .map_err(|e| remote_error("create commit", e))?;
        debug!(sha = %commit.sha, "Created commit");
        Ok(commit.sha)
    }

    async fn update_ref(&self, branch: &str, sha: &str, force: bool) -> Result<(), StoreError> {
        self.guard("update ref").await?;
        match self.resolve_ref(branch).await {
            Ok(_) => {
                let _: GitRef = self
                    .octocrab
                    .patch(
                        self.route(&format!("git/refs/heads/{branch}")),
                        Some(&RefUpdate { sha, force }),
                    )
                    .await
                    .map_err(|e| remote_error("update ref", e))?;
            }
            Err(StoreError::RefNotFound { .. }) => {
                let _: GitRef = self
                    .octocrab
                    .post(
                        self.route("git/refs"),
                        Some(&NewRef {
                            reference: format!("refs/heads/{branch}"),
                            sha,
                        }),
                    )
                    .await
                    .map_err(|e| remote_error("create ref", e))?;
            }
            Err(e) => return Err(e),
        }
        debug!(branch, sha, force, "Updated ref");
        Ok(())
    }

    async fn find_open_pull_request(
        &self,
        head_branch: &str,
    ) -> Result<Option<PullRequest>, StoreError> {
        let page = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .list()
            .state(State::Open)
            .head(format!("{}:{head_branch}", self.owner))
            .per_page(10)
            .send()
            .await
            .map_err(|e| remote_error("list pull requests", e))?;

        Ok(page.items.into_iter().next().map(|pr| self.pull_request(pr)))
    }

    async fn create_pull_request(
        &self,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<PullRequest, StoreError> {
        self.guard("create pull request").await?;
        let pr = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await
            .map_err(|e| remote_error("create pull request", e))?;
        Ok(self.pull_request(pr))
    }

    async fn update_pull_request(&self, number: u64, title: &str, body: &str) -> Result<(), StoreError> {
        self.guard("update pull request").await?;
        self.octocrab
            .pulls(&self.owner, &self.repo)
            .update(number)
            .title(title)
            .body(body)
            .send()
            .await
            .map_err(|e| remote_error("update pull request", e))?;
        Ok(())
    }
}

#[async_trait]
impl CommitSource for GitHubStore {
    async fn commits_since(&self, branch: &str, since: Option<&str>) -> Result<Vec<Commit>, StoreError> {
        let mut history = Vec::new();

        for page in 1..=MAX_HISTORY_PAGES {
            let query = HistoryQuery {
                sha: branch,
                per_page: HISTORY_PAGE_SIZE,
                page,
            };
            let batch: Vec<HistoryCommit> = self
                .octocrab
                .get(self.route("commits"), Some(&query))
                .await
                .map_err(|e| remote_error("list commits", e))?;

            let exhausted = batch.len() < usize::from(HISTORY_PAGE_SIZE);
            let mut reached_anchor = false;
            for item in batch {
                let author = item.commit.author.unwrap_or(HistoryAuthor { name: None, date: None });
                let commit = Commit::new(item.sha, item.commit.message)
                    .with_author(author.name.unwrap_or_default(), author.date.unwrap_or_default());
                reached_anchor |= Some(commit.sha.as_str()) == since
                    || crate::metadata::extract_version(&commit.message).is_some();
                history.push(commit);
            }

            if reached_anchor || exhausted {
                break;
            }
        }

        Ok(commits_after_release(history, since))
    }
}

#[async_trait]
impl Notifier for GitHubStore {
    async fn notify(&self, pr_number: u64, text: &str) -> Result<(), StoreError> {
        self.octocrab
            .issues(&self.owner, &self.repo)
            .create_comment(pr_number, text)
            .await
            .map_err(|e| remote_error("post comment", e))?;
        Ok(())
    }
}

fn is_not_found(error: &octocrab::Error) -> bool {
    matches!(error, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

fn remote_error(operation: &str, error: octocrab::Error) -> StoreError {
    let status = match &error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    };
    StoreError::remote(operation, status, error.to_string())
}
